//! Epoch-level training

use super::core::Trainer;
use crate::attack::Fgsm;
use crate::nn::Module;
use crate::train::Batch;

impl Trainer {
    /// Train over one pass of the given batches.
    ///
    /// Runs one adversarial step per batch when an attack is supplied,
    /// otherwise one plain step. Returns the mean clean loss.
    pub fn train_epoch(
        &mut self,
        model: &dyn Module,
        batches: Vec<Batch>,
        attack: Option<&Fgsm>,
    ) -> f32 {
        let steps_per_epoch = batches.len();
        let mut total_loss = 0.0;
        let mut num_batches = 0;

        for (i, batch) in batches.into_iter().enumerate() {
            let loss = match attack {
                Some(attack) => self.adversarial_step(model, &batch, attack),
                None => self.train_step(model, &batch),
            };
            total_loss += loss;
            num_batches += 1;

            if self.config.log_interval > 0 && (i + 1) % self.config.log_interval == 0 {
                println!(
                    "Epoch {}, Step {}: loss={:.4}, lr={:.6}",
                    self.metrics.epoch,
                    i + 1,
                    total_loss / num_batches as f32,
                    self.lr()
                );
            }

            let ctx = self.build_context(
                self.metrics.epoch,
                0,
                i + 1,
                steps_per_epoch,
                loss,
                None,
                None,
                -1,
            );
            self.callbacks.on_step_end(&ctx);
        }

        let avg_loss = if num_batches > 0 {
            total_loss / num_batches as f32
        } else {
            0.0
        };

        self.metrics.record_epoch(avg_loss, self.lr());

        avg_loss
    }
}
