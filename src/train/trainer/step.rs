//! Per-batch update steps

use super::core::Trainer;
use crate::attack::Fgsm;
use crate::autograd::Mode;
use crate::nn::Module;
use crate::train::Batch;

impl Trainer {
    /// Perform a single optimization step on one batch.
    ///
    /// Clears previous gradients, runs the forward pass in training
    /// mode, computes the loss, backpropagates, and applies the
    /// optimizer update. Returns the scalar loss value. Mutates the
    /// parameters and the optimizer's momentum state exactly once.
    pub fn train_step(&mut self, model: &dyn Module, batch: &Batch) -> f32 {
        // Zero gradients
        self.optimizer.zero_grad(&mut self.params);

        // Forward pass
        let predictions = model.forward(&batch.inputs, Mode::Train);

        // Compute loss
        let loss = self.loss_fn.forward(&predictions, &batch.targets);
        let loss_val = loss.data()[0];

        // Backward pass
        if let Some(backward_op) = loss.backward_op() {
            backward_op.backward();
        }

        // Optimizer step
        self.optimizer.step(&mut self.params);

        self.metrics.increment_step();

        loss_val
    }

    /// Clean update followed by an update on the FGSM-perturbed batch.
    ///
    /// The perturbation is generated from the parameters as they stand
    /// after the clean update. Only the clean loss is returned; the
    /// adversarial update's loss is not reported.
    pub fn adversarial_step(&mut self, model: &dyn Module, batch: &Batch, attack: &Fgsm) -> f32 {
        let clean_loss = self.train_step(model, batch);

        let adv_inputs = attack.perturb(model, batch);
        let adv_batch = Batch::new(adv_inputs, batch.targets.clone());
        self.train_step(model, &adv_batch);

        clean_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::Tensor;
    use crate::nn::MlpClassifier;
    use crate::optim::SGD;
    use crate::train::{TrainConfig, Trainer};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (MlpClassifier, Trainer, Batch) {
        let mut rng = StdRng::seed_from_u64(0);
        let model = MlpClassifier::new(8, 8, 2, &mut rng);
        let trainer = Trainer::new(
            model.parameters(),
            Box::new(SGD::new(0.05, 0.5)),
            TrainConfig::default(),
        );
        let batch = Batch::new(
            Tensor::from_vec(vec![0.5, -0.5, 0.2, 0.8, -0.3, 0.1, 0.9, -0.9], false),
            Tensor::from_vec(vec![1.0], false),
        );
        (model, trainer, batch)
    }

    #[test]
    fn test_train_step_returns_finite_loss_and_counts() {
        let (model, mut trainer, batch) = setup();

        let loss = trainer.train_step(&model, &batch);
        assert!(loss > 0.0);
        assert!(loss.is_finite());
        assert_eq!(trainer.metrics.steps, 1);
    }

    #[test]
    fn test_train_step_mutates_parameters() {
        let (model, mut trainer, batch) = setup();
        let before = trainer.params()[0].to_vec();

        trainer.train_step(&model, &batch);
        let after = trainer.params()[0].to_vec();
        assert_ne!(before, after);
    }

    #[test]
    fn test_adversarial_step_counts_two_updates() {
        let (model, mut trainer, batch) = setup();
        let attack = Fgsm::new(0.3).unwrap();

        trainer.adversarial_step(&model, &batch, &attack);
        assert_eq!(trainer.metrics.steps, 2);
    }

    #[test]
    fn test_adversarial_step_reports_clean_loss() {
        let (model, mut trainer, batch) = setup();
        let attack = Fgsm::new(0.0).unwrap();

        // With ε = 0 the two updates see the same inputs; the reported
        // loss is the one computed before any update this batch.
        let reported = trainer.adversarial_step(&model, &batch, &attack);
        assert!(reported.is_finite());
    }
}
