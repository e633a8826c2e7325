//! GAN training command

use crate::cli::logging::{log, LogLevel};
use crate::data::{synthetic_blobs, BatchLoader};
use crate::error::Result;
use crate::gan::GanTrainer;
use crate::io::{save_model, snapshot};
use crate::nn::{Discriminator, Generator};
use crate::optim::SGD;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Arguments for GAN training
#[derive(Args, Debug)]
pub struct GanArgs {
    /// Number of epochs to train
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Input batch size
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Learning rate for both networks
    #[arg(long, default_value_t = 0.01)]
    pub lr: f32,

    /// SGD momentum for both networks
    #[arg(long, default_value_t = 0.5)]
    pub momentum: f32,

    /// Latent dimension
    #[arg(long, default_value_t = 64)]
    pub latent_dim: usize,

    /// Base channel width
    #[arg(long, default_value_t = 16)]
    pub dim: usize,

    /// Apply spectral normalization to both networks
    #[arg(long)]
    pub spectral_norm: bool,

    /// Random seed
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Number of synthetic real examples
    #[arg(long, default_value_t = 1000)]
    pub examples: usize,

    /// Directory the generator checkpoint is written into
    #[arg(long, default_value = "trained_models")]
    pub out_dir: PathBuf,
}

/// Run GAN training
pub fn run(args: &GanArgs, level: LogLevel) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);

    let ds = synthetic_blobs(args.examples, 4, (1, 32, 32), &mut rng);
    let loader = BatchLoader::new(ds, args.batch_size, true)?;

    let generator = Generator::new(args.latent_dim, 1, args.dim, args.spectral_norm, &mut rng);
    let discriminator = Discriminator::new(1, args.dim, args.spectral_norm, &mut rng);
    let mut trainer = GanTrainer::new(
        generator,
        discriminator,
        Box::new(SGD::new(args.lr, args.momentum)),
        Box::new(SGD::new(args.lr, args.momentum)),
    );

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training GAN for {} epochs (dim={}, latent={}, sn={})",
            args.epochs, args.dim, args.latent_dim, args.spectral_norm
        ),
    );

    for epoch in 1..=args.epochs {
        let batches = loader.batches(&mut rng);
        let (d_loss, g_loss) = trainer.train_epoch(batches, &mut rng);
        log(
            level,
            LogLevel::Normal,
            &format!("Epoch {}/{}: d_loss={d_loss:.4}, g_loss={g_loss:.4}", epoch, args.epochs),
        );
    }

    let name = if args.spectral_norm {
        "generator_sn"
    } else {
        "generator"
    };
    let model = snapshot(name, "generator", trainer.generator());
    let path = args.out_dir.join(format!("{name}.json"));
    save_model(&model, &path)?;
    log(
        level,
        LogLevel::Normal,
        &format!("saved generator to {}", path.display()),
    );
    Ok(())
}
