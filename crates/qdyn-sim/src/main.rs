use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    cats::{self, CatsArgs},
    chaotic::{self, ChaoticArgs},
    dicke::{self, DickeArgs},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "qdyn-sim", about = "Synthetic measurement datasets for layered many-body dynamics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Random chaotic chain on the 4x4 lattice.
    Chaotic(ChaoticArgs),
    /// Generalized GHZ (cat) states for a list of polar angles.
    Cats(CatsArgs),
    /// Dicke state with a fixed number of excitations.
    Dicke(DickeArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Chaotic(args) => chaotic::run(&args),
        Command::Cats(args) => cats::run(&args),
        Command::Dicke(args) => dicke::run(&args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdyn_basis::Basis;

    #[test]
    fn chaotic_flags_parse() {
        let cli = Cli::try_parse_from([
            "qdyn-sim", "chaotic", "-n", "64", "--basis", "z", "--load", "chain.bin",
            "--layers", "-1",
        ])
        .unwrap();
        let Command::Chaotic(args) = cli.command else {
            panic!("expected chaotic");
        };
        assert_eq!(args.run.niter, Some(64));
        assert_eq!(args.run.basis, Some(Basis::Fixed));
        assert_eq!(args.depth, 19);
        assert_eq!(args.layers, -1);
        assert!(chaotic::run(&args).is_err());
    }

    #[test]
    fn unknown_basis_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["qdyn-sim", "dicke", "--basis", "x"]).is_err());
        let cli = Cli::try_parse_from(["qdyn-sim", "dicke", "-D", "3", "--qbits", "5"]).unwrap();
        let Command::Dicke(args) = cli.command else {
            panic!("expected dicke");
        };
        assert_eq!(args.excitations, 3);
    }

    #[test]
    fn cats_accept_theta_list() {
        let cli =
            Cli::try_parse_from(["qdyn-sim", "cats", "--theta", "0.1", "0.2", "--qbits", "3"])
                .unwrap();
        let Command::Cats(args) = cli.command else {
            panic!("expected cats");
        };
        assert_eq!(args.theta, vec![0.1, 0.2]);
        assert_eq!(args.qbits, 3);
    }

    #[test]
    fn chaotic_save_needs_no_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        let cli = Cli::try_parse_from([
            "qdyn-sim",
            "chaotic",
            "--seed",
            "3",
            "--depth",
            "2",
            "--save",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let Command::Chaotic(args) = cli.command else {
            panic!("expected chaotic");
        };
        chaotic::run(&args).unwrap();
        let chain = qdyn_chain::load_chain(&path, None).unwrap();
        assert_eq!(chain.len(), 5);
    }
}
