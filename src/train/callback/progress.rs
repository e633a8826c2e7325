//! Progress callback for logging training progress

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Prints epoch summaries and periodic step lines.
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    /// Log every N steps
    log_interval: usize,
}

impl ProgressCallback {
    /// Create progress callback
    pub fn new(log_interval: usize) -> Self {
        Self { log_interval }
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self { log_interval: 100 }
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        let val_str = ctx
            .val_loss
            .map(|v| format!(", val_loss: {v:.4}"))
            .unwrap_or_default();
        let acc_str = ctx
            .correct
            .map(|c| format!(", correct: {c}"))
            .unwrap_or_default();

        println!(
            "Epoch {}/{}: loss: {:.4}{}{} ({:.1}s)",
            ctx.epoch + 1,
            ctx.max_epochs,
            ctx.loss,
            val_str,
            acc_str,
            ctx.elapsed_secs
        );
        CallbackAction::Continue
    }

    fn on_step_end(&mut self, ctx: &CallbackContext) {
        if self.log_interval > 0 && ctx.step > 0 && ctx.step % self.log_interval == 0 {
            println!(
                "  Step {}/{}: loss: {:.4}",
                ctx.step, ctx.steps_per_epoch, ctx.loss
            );
        }
    }

    fn name(&self) -> &'static str {
        "ProgressCallback"
    }
}
