//! Callback dispatch

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Owns registered callbacks and fans events out to them.
#[derive(Default)]
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Check whether any callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Dispatch train-begin
    pub fn on_train_begin(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_train_begin(ctx);
        }
    }

    /// Dispatch train-end
    pub fn on_train_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_train_end(ctx);
        }
    }

    /// Dispatch epoch-end; any Stop wins
    pub fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        let mut action = CallbackAction::Continue;
        for cb in &mut self.callbacks {
            if cb.on_epoch_end(ctx) == CallbackAction::Stop {
                action = CallbackAction::Stop;
            }
        }
        action
    }

    /// Dispatch step-end
    pub fn on_step_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_step_end(ctx);
        }
    }
}
