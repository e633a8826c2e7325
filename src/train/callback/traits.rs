//! Core traits and types for the callback system

/// Context passed to callbacks with current training state
#[derive(Clone, Debug)]
pub struct CallbackContext {
    /// Current epoch (0-indexed)
    pub epoch: usize,
    /// Total epochs planned
    pub max_epochs: usize,
    /// Current step within epoch
    pub step: usize,
    /// Total steps in epoch
    pub steps_per_epoch: usize,
    /// Optimizer updates performed so far
    pub global_step: usize,
    /// Current clean loss value
    pub loss: f32,
    /// Current learning rate
    pub lr: f32,
    /// Evaluation loss (if evaluation ran)
    pub val_loss: Option<f32>,
    /// Correct predictions from the last evaluation
    pub correct: Option<usize>,
    /// Best correct-count seen so far (−1 before the first evaluation)
    pub best_correct: i64,
    /// Training duration in seconds
    pub elapsed_secs: f64,
}

impl Default for CallbackContext {
    fn default() -> Self {
        Self {
            epoch: 0,
            max_epochs: 0,
            step: 0,
            steps_per_epoch: 0,
            global_step: 0,
            loss: 0.0,
            lr: 0.0,
            val_loss: None,
            correct: None,
            best_correct: -1,
            elapsed_secs: 0.0,
        }
    }
}

/// Action to take after a callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Continue training normally
    Continue,
    /// Stop training
    Stop,
}

/// Trait for training callbacks
///
/// All methods have default no-op implementations; implement only the
/// events you care about.
pub trait TrainerCallback {
    /// Called before training starts
    fn on_train_begin(&mut self, _ctx: &CallbackContext) {}

    /// Called after training ends
    fn on_train_end(&mut self, _ctx: &CallbackContext) {}

    /// Called after each epoch (evaluation results included)
    fn on_epoch_end(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after each training step
    fn on_step_end(&mut self, _ctx: &CallbackContext) {}

    /// Get callback name for logging
    fn name(&self) -> &'static str {
        "TrainerCallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_context_default() {
        let ctx = CallbackContext::default();
        assert_eq!(ctx.epoch, 0);
        assert_eq!(ctx.best_correct, -1);
        assert!(ctx.val_loss.is_none());
    }

    #[test]
    fn test_default_callback_impl() {
        struct Minimal;
        impl TrainerCallback for Minimal {
            fn name(&self) -> &'static str {
                "Minimal"
            }
        }

        let mut cb = Minimal;
        let ctx = CallbackContext::default();
        cb.on_train_begin(&ctx);
        cb.on_step_end(&ctx);
        assert_eq!(cb.on_epoch_end(&ctx), CallbackAction::Continue);
        cb.on_train_end(&ctx);
        assert_eq!(cb.name(), "Minimal");
    }
}
