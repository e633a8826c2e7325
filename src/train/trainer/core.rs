//! Core Trainer struct and basic methods

use crate::autograd::Tensor;
use crate::optim::Optimizer;
use crate::train::callback::{CallbackContext, CallbackManager, TrainerCallback};
use crate::train::{CrossEntropyLoss, LossFn, MetricsTracker, TrainConfig};
use std::time::Instant;

/// Orchestrates the training loop for one model.
///
/// Holds the parameter handles the optimizer mutates; because tensors
/// are shared, these are the same storage the model reads during its
/// forward pass. Construct with `model.parameters()`.
///
/// # Example
///
/// ```no_run
/// use endurecer::nn::{MlpClassifier, Module};
/// use endurecer::optim::SGD;
/// use endurecer::train::{TrainConfig, Trainer};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let model = MlpClassifier::new(1024, 256, 10, &mut rng);
/// let optimizer = SGD::new(0.01, 0.5);
/// let mut trainer = Trainer::new(model.parameters(), Box::new(optimizer), TrainConfig::new());
/// ```
pub struct Trainer {
    /// Model parameters (shared handles)
    pub(crate) params: Vec<Tensor>,

    /// Optimizer
    pub(crate) optimizer: Box<dyn Optimizer>,

    /// Loss function for update steps
    pub(crate) loss_fn: Box<dyn LossFn>,

    /// Training configuration
    pub(crate) config: TrainConfig,

    /// Metrics tracker
    pub metrics: MetricsTracker,

    /// Callback manager
    pub(crate) callbacks: CallbackManager,

    /// Training start time
    pub(crate) start_time: Option<Instant>,
}

impl Trainer {
    /// Create a new trainer with mean cross-entropy loss
    pub fn new(params: Vec<Tensor>, optimizer: Box<dyn Optimizer>, config: TrainConfig) -> Self {
        Self {
            params,
            optimizer,
            loss_fn: Box::new(CrossEntropyLoss::mean()),
            config,
            metrics: MetricsTracker::new(),
            callbacks: CallbackManager::new(),
            start_time: None,
        }
    }

    /// Replace the loss function
    pub fn set_loss(&mut self, loss_fn: Box<dyn LossFn>) {
        self.loss_fn = loss_fn;
    }

    /// Add a callback to the trainer
    pub fn add_callback<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    /// Get current learning rate
    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Set learning rate
    pub fn set_lr(&mut self, lr: f32) {
        self.optimizer.set_lr(lr);
    }

    /// Get reference to model parameters
    pub fn params(&self) -> &[Tensor] {
        &self.params
    }

    /// Build callback context from current state
    pub(crate) fn build_context(
        &self,
        epoch: usize,
        max_epochs: usize,
        step: usize,
        steps_per_epoch: usize,
        loss: f32,
        val_loss: Option<f32>,
        correct: Option<usize>,
        best_correct: i64,
    ) -> CallbackContext {
        CallbackContext {
            epoch,
            max_epochs,
            step,
            steps_per_epoch,
            global_step: self.metrics.steps,
            loss,
            lr: self.lr(),
            val_loss,
            correct,
            best_correct,
            elapsed_secs: self.start_time.map_or(0.0, |t| t.elapsed().as_secs_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::SGD;

    #[test]
    fn test_trainer_creation() {
        let params = vec![Tensor::zeros(10, true)];
        let optimizer = SGD::new(0.01, 0.5);
        let trainer = Trainer::new(params, Box::new(optimizer), TrainConfig::default());

        assert_eq!(trainer.params().len(), 1);
        assert_eq!(trainer.lr(), 0.01);
    }

    #[test]
    fn test_set_lr() {
        let params = vec![Tensor::zeros(10, true)];
        let optimizer = SGD::new(0.01, 0.5);
        let mut trainer = Trainer::new(params, Box::new(optimizer), TrainConfig::default());

        trainer.set_lr(0.001);
        assert_eq!(trainer.lr(), 0.001);
    }

    #[test]
    fn test_add_callback() {
        use crate::train::ProgressCallback;

        let params = vec![Tensor::zeros(10, true)];
        let optimizer = SGD::new(0.01, 0.5);
        let mut trainer = Trainer::new(params, Box::new(optimizer), TrainConfig::default());

        assert!(trainer.callbacks.is_empty());
        trainer.add_callback(ProgressCallback::new(5));
        assert!(!trainer.callbacks.is_empty());
    }
}
