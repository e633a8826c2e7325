//! Fit driver: the outer epoch loop

use super::core::Trainer;
use super::result::FitResult;
use crate::attack::Fgsm;
use crate::data::BatchLoader;
use crate::error::Result;
use crate::eval::evaluate;
use crate::io::{save_model, snapshot};
use crate::nn::Module;
use crate::train::CallbackAction;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Instant;

/// Where and under what identity checkpoints are written.
#[derive(Clone, Debug)]
pub struct CheckpointSpec {
    /// Directory checkpoints are written into (created on demand)
    pub dir: PathBuf,
    /// Run name, derived from the run configuration
    pub name: String,
    /// Architecture tag stored in the checkpoint metadata
    pub architecture: String,
}

impl CheckpointSpec {
    /// Checkpoint file path for this run
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.name))
    }
}

/// Configuration of a fit run.
///
/// Carries the state the run needs explicitly; there are no
/// process-wide globals.
pub struct FitOptions {
    /// Number of epochs
    pub epochs: usize,
    /// Seed for the epoch shuffle RNG
    pub seed: u64,
    /// Adversarial training attack; None trains on clean data only
    pub attack: Option<Fgsm>,
    /// Checkpoint destination; None disables persistence
    pub checkpoint: Option<CheckpointSpec>,
}

impl Trainer {
    /// Run the full training loop.
    ///
    /// Per epoch: train over a freshly shuffled pass of the training
    /// loader, evaluate once over the test loader, and persist a
    /// checkpoint whenever the correct-count strictly exceeds the best
    /// seen so far. The tracker starts at −1, so the first evaluation
    /// always checkpoints. Any error aborts the run.
    pub fn fit(
        &mut self,
        model: &dyn Module,
        train_loader: &BatchLoader,
        test_loader: &BatchLoader,
        opts: &FitOptions,
    ) -> Result<FitResult> {
        let mut rng = StdRng::seed_from_u64(opts.seed);
        self.start_time = Some(Instant::now());

        let mut best_correct: i64 = -1;
        let mut final_loss = 0.0;
        let mut stopped_early = false;
        let mut epochs_run = 0;

        let begin_ctx = self.build_context(0, opts.epochs, 0, 0, 0.0, None, None, best_correct);
        self.callbacks.on_train_begin(&begin_ctx);

        for epoch in 0..opts.epochs {
            let batches = train_loader.batches(&mut rng);
            let steps_per_epoch = batches.len();
            final_loss = self.train_epoch(model, batches, opts.attack.as_ref());
            epochs_run = epoch + 1;

            let report = evaluate(
                model,
                test_loader.batches(&mut rng),
                test_loader.num_examples(),
            );
            self.metrics.record_val_loss(report.mean_loss);

            if (report.correct as i64) > best_correct {
                best_correct = report.correct as i64;
                if let Some(ck) = &opts.checkpoint {
                    let model_snapshot = snapshot(&ck.name, &ck.architecture, model);
                    save_model(&model_snapshot, ck.path())?;
                }
            }

            let ctx = self.build_context(
                epoch,
                opts.epochs,
                steps_per_epoch,
                steps_per_epoch,
                final_loss,
                Some(report.mean_loss),
                Some(report.correct),
                best_correct,
            );
            if self.callbacks.on_epoch_end(&ctx) == CallbackAction::Stop {
                stopped_early = true;
                break;
            }
        }

        let elapsed_secs = self
            .start_time
            .map_or(0.0, |t| t.elapsed().as_secs_f64());
        let end_ctx = self.build_context(
            epochs_run.saturating_sub(1),
            opts.epochs,
            0,
            0,
            final_loss,
            None,
            None,
            best_correct,
        );
        self.callbacks.on_train_end(&end_ctx);

        Ok(FitResult {
            best_correct,
            final_loss,
            epochs: epochs_run,
            stopped_early,
            elapsed_secs,
        })
    }
}
