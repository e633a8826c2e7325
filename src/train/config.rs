//! Training configuration and metrics tracking

/// Training configuration
#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// Log a progress line every N steps
    pub log_interval: usize,
}

impl TrainConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self { log_interval: 100 }
    }

    /// Set the logging interval
    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Running counters and loss history for a training run.
///
/// `steps` counts optimizer updates: an adversarial batch contributes
/// two, a plain batch one.
#[derive(Clone, Debug, Default)]
pub struct MetricsTracker {
    /// Optimizer updates performed
    pub steps: usize,
    /// Epochs completed
    pub epoch: usize,
    /// Mean clean loss per epoch
    pub losses: Vec<f32>,
    /// Evaluation loss per epoch
    pub val_losses: Vec<f32>,
    /// Learning rate per epoch
    pub lrs: Vec<f32>,
}

impl MetricsTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one optimizer update
    pub fn increment_step(&mut self) {
        self.steps += 1;
    }

    /// Record the end of an epoch
    pub fn record_epoch(&mut self, loss: f32, lr: f32) {
        self.epoch += 1;
        self.losses.push(loss);
        self.lrs.push(lr);
    }

    /// Record an evaluation loss
    pub fn record_val_loss(&mut self, loss: f32) {
        self.val_losses.push(loss);
    }

    /// Lowest epoch loss seen so far
    pub fn best_loss(&self) -> Option<f32> {
        self.losses.iter().copied().fold(None, |best, l| match best {
            Some(b) if b <= l => Some(b),
            _ => Some(l),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_config_builder() {
        let config = TrainConfig::new().with_log_interval(10);
        assert_eq!(config.log_interval, 10);
    }

    #[test]
    fn test_metrics_tracker_counts() {
        let mut m = MetricsTracker::new();
        m.increment_step();
        m.increment_step();
        m.record_epoch(0.5, 0.01);
        m.record_val_loss(0.6);

        assert_eq!(m.steps, 2);
        assert_eq!(m.epoch, 1);
        assert_eq!(m.losses, vec![0.5]);
        assert_eq!(m.val_losses, vec![0.6]);
    }

    #[test]
    fn test_best_loss() {
        let mut m = MetricsTracker::new();
        assert!(m.best_loss().is_none());

        m.record_epoch(0.9, 0.01);
        m.record_epoch(0.3, 0.01);
        m.record_epoch(0.5, 0.01);
        assert_eq!(m.best_loss(), Some(0.3));
    }
}
