use std::error::Error;

use clap::Args;
use qdyn_exp::run_cats;

use super::{executor_for, RunArgs};

#[derive(Args, Debug)]
pub struct CatsArgs {
    #[command(flatten)]
    pub run: RunArgs,
    /// Total number of sites.
    #[arg(long, default_value_t = 16)]
    pub qbits: usize,
    /// Polar angle(s) of the cat states (default: 0, pi/8, pi/4, 3pi/8, pi/2).
    #[arg(long, num_args = 1.., allow_negative_numbers = true)]
    pub theta: Vec<f64>,
}

pub fn run(args: &CatsArgs) -> Result<(), Box<dyn Error>> {
    let config = args.run.resolve()?;
    let executor = executor_for(&config)?;
    for path in run_cats(args.qbits, &args.theta, &config, &executor)? {
        println!("{}", path.display());
    }
    Ok(())
}
