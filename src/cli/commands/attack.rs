//! Robustness evaluation command

use super::Arch;
use crate::attack::Fgsm;
use crate::cli::logging::{log, LogLevel};
use crate::data::{synthetic_blobs, BatchLoader};
use crate::error::Result;
use crate::eval::{evaluate, evaluate_under_attack};
use crate::io::{load_model, restore};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Arguments for robustness evaluation
#[derive(Args, Debug)]
pub struct AttackArgs {
    /// Checkpoint to evaluate
    pub checkpoint: PathBuf,

    /// Architecture the checkpoint was trained with
    #[arg(long, value_enum, default_value_t = Arch::Cnn)]
    pub arch: Arch,

    /// FGSM perturbation budget
    #[arg(long, default_value_t = 0.3)]
    pub eps: f32,

    /// Random seed for the evaluation dataset
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Input batch size
    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,

    /// Number of synthetic evaluation examples
    #[arg(long, default_value_t = 500)]
    pub examples: usize,

    /// Number of classes
    #[arg(long, default_value_t = 10)]
    pub classes: usize,
}

/// Run robustness evaluation against a saved checkpoint
pub fn run(args: &AttackArgs, level: LogLevel) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);

    let model = super::train::build_model(args.arch, args.classes, &mut rng);
    let saved = load_model(&args.checkpoint)?;
    restore(model.as_ref(), &saved)?;

    let ds = synthetic_blobs(args.examples, args.classes, (1, 32, 32), &mut rng);
    let loader = BatchLoader::new(ds, args.batch_size, false)?;
    let n = loader.num_examples();

    let clean = evaluate(model.as_ref(), loader.batches(&mut rng), n);
    let attack = Fgsm::new(args.eps)?;
    let attacked = evaluate_under_attack(model.as_ref(), &attack, loader.batches(&mut rng), n);

    log(
        level,
        LogLevel::Normal,
        &format!(
            "clean:    loss={:.4}, accuracy={}/{} ({:.2}%)",
            clean.mean_loss,
            clean.correct,
            clean.total,
            100.0 * clean.accuracy()
        ),
    );
    log(
        level,
        LogLevel::Normal,
        &format!(
            "eps={}: loss={:.4}, accuracy={}/{} ({:.2}%)",
            args.eps,
            attacked.mean_loss,
            attacked.correct,
            attacked.total,
            100.0 * attacked.accuracy()
        ),
    );
    Ok(())
}
