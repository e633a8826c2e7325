//! endurecer CLI
//!
//! Training and robustness-evaluation entry point.
//!
//! # Usage
//!
//! ```bash
//! # Train a CNN classifier with adversarial training
//! endurecer train --arch cnn --adv --epochs 10
//!
//! # Evaluate a checkpoint under FGSM
//! endurecer attack trained_models/cnn_adv.json --arch cnn --eps 0.3
//!
//! # Train a generator/discriminator pair with spectral normalization
//! endurecer gan --spectral-norm
//! ```

use clap::Parser;
use endurecer::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
