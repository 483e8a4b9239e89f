use std::error::Error;

use clap::Args;
use qdyn_exp::run_dicke;

use super::{executor_for, RunArgs};

#[derive(Args, Debug)]
pub struct DickeArgs {
    #[command(flatten)]
    pub run: RunArgs,
    /// Total number of sites.
    #[arg(long, default_value_t = 16)]
    pub qbits: usize,
    /// Number of excitations of the Dicke state.
    #[arg(short = 'D', default_value_t = 1)]
    pub excitations: usize,
}

pub fn run(args: &DickeArgs) -> Result<(), Box<dyn Error>> {
    let config = args.run.resolve()?;
    let executor = executor_for(&config)?;
    let path = run_dicke(args.qbits, args.excitations, &config, &executor)?;
    println!("{}", path.display());
    Ok(())
}
