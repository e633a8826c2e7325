//! CLI command definitions and dispatch

mod attack;
mod gan;
mod train;

pub use attack::AttackArgs;
pub use gan::GanArgs;
pub use train::TrainArgs;

use super::logging::LogLevel;
use crate::error::Result;
use clap::{Parser, Subcommand, ValueEnum};

/// Command-line interface
#[derive(Parser)]
#[command(
    name = "endurecer",
    version,
    about = "Train and harden small image classifiers with FGSM adversarial training"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress all output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Train a classifier, optionally with adversarial training
    Train(TrainArgs),
    /// Evaluate a checkpoint's robustness under an FGSM attack
    Attack(AttackArgs),
    /// Train a generator/discriminator pair
    Gan(GanArgs),
}

/// Classifier architecture choice
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Arch {
    /// Fully-connected classifier
    Mlp,
    /// Convolutional classifier
    Cnn,
}

impl Arch {
    /// Tag used in checkpoint names and metadata
    pub fn name(self) -> &'static str {
        match self {
            Arch::Mlp => "mlp",
            Arch::Cnn => "cnn",
        }
    }
}

/// Run the selected command
pub fn run_command(cli: Cli) -> Result<()> {
    let level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    match cli.command {
        Command::Train(args) => train::run(&args, level),
        Command::Attack(args) => attack::run(&args, level),
        Command::Gan(args) => gan::run(&args, level),
    }
}
