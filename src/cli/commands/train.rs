//! Classifier training command

use super::Arch;
use crate::attack::Fgsm;
use crate::cli::logging::{log, LogLevel};
use crate::data::{synthetic_blobs, BatchLoader};
use crate::error::Result;
use crate::io::checkpoint_name;
use crate::nn::{CnnClassifier, MlpClassifier, Module};
use crate::optim::SGD;
use crate::train::{CheckpointSpec, FitOptions, ProgressCallback, TrainConfig, Trainer};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Arguments for classifier training
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Architecture to train
    #[arg(long, value_enum, default_value_t = Arch::Cnn)]
    pub arch: Arch,

    /// Number of epochs to train
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Input batch size for training
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Input batch size for testing
    #[arg(long, default_value_t = 256)]
    pub test_batch_size: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.01)]
    pub lr: f32,

    /// SGD momentum
    #[arg(long, default_value_t = 0.5)]
    pub momentum: f32,

    /// Enable adversarial training
    #[arg(long)]
    pub adv: bool,

    /// FGSM perturbation budget for adversarial training
    #[arg(long, default_value_t = 0.3)]
    pub eps: f32,

    /// Random seed
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// How many batches to wait before logging training status
    #[arg(long, default_value_t = 100)]
    pub log_interval: usize,

    /// Directory checkpoints are written into
    #[arg(long, default_value = "trained_models")]
    pub out_dir: PathBuf,

    /// Number of synthetic training examples
    #[arg(long, default_value_t = 2000)]
    pub train_examples: usize,

    /// Number of synthetic test examples
    #[arg(long, default_value_t = 500)]
    pub test_examples: usize,

    /// Number of classes
    #[arg(long, default_value_t = 10)]
    pub classes: usize,
}

/// Build the selected architecture
pub(crate) fn build_model(arch: Arch, classes: usize, rng: &mut StdRng) -> Box<dyn Module> {
    match arch {
        Arch::Mlp => Box::new(MlpClassifier::new(1024, 256, classes, rng)),
        Arch::Cnn => Box::new(CnnClassifier::new(1, classes, rng)),
    }
}

/// Run classifier training
pub fn run(args: &TrainArgs, level: LogLevel) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);

    let shape = (1, 32, 32);
    let train_ds = synthetic_blobs(args.train_examples, args.classes, shape, &mut rng);
    let test_ds = synthetic_blobs(args.test_examples, args.classes, shape, &mut rng);
    let train_loader = BatchLoader::new(train_ds, args.batch_size, true)?;
    let test_loader = BatchLoader::new(test_ds, args.test_batch_size, false)?;

    let model = build_model(args.arch, args.classes, &mut rng);

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training {} for {} epochs (lr={}, momentum={}, adv={})",
            args.arch.name(),
            args.epochs,
            args.lr,
            args.momentum,
            args.adv
        ),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  {} train / {} test examples, batch size {}",
            train_loader.num_examples(),
            test_loader.num_examples(),
            args.batch_size
        ),
    );

    let mut trainer = Trainer::new(
        model.parameters(),
        Box::new(SGD::new(args.lr, args.momentum)),
        TrainConfig::new().with_log_interval(args.log_interval),
    );
    if level != LogLevel::Quiet {
        trainer.add_callback(ProgressCallback::new(args.log_interval));
    }

    let attack = if args.adv {
        Some(Fgsm::new(args.eps)?)
    } else {
        None
    };

    let opts = FitOptions {
        epochs: args.epochs,
        seed: args.seed,
        attack,
        checkpoint: Some(CheckpointSpec {
            dir: args.out_dir.clone(),
            name: checkpoint_name(args.arch.name(), args.adv),
            architecture: args.arch.name().to_string(),
        }),
    };

    let result = trainer.fit(model.as_ref(), &train_loader, &test_loader, &opts)?;

    log(
        level,
        LogLevel::Normal,
        &format!("best: {}", result.best_correct),
    );
    Ok(())
}
