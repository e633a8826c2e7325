//! Binary cross-entropy with logits
//!
//! Combines a sigmoid activation with binary cross-entropy, computed in
//! the numerically stable form
//! `L_i = max(x_i, 0) - x_i·t_i + ln(1 + exp(-|x_i|))`, averaged over
//! the batch. Gradient: `∂L/∂x_i = (σ(x_i) − t_i) / N`.

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

use super::LossFn;

/// Binary cross-entropy with logits, mean reduction.
///
/// Used for the discriminator/generator real-vs-fake objectives, where
/// each example carries a single logit and a 0/1 target.
pub struct BCEWithLogitsLoss;

impl BCEWithLogitsLoss {
    /// Numerically stable sigmoid
    pub(crate) fn sigmoid(x: f32) -> f32 {
        if x >= 0.0 {
            1.0 / (1.0 + (-x).exp())
        } else {
            let e = x.exp();
            e / (1.0 + e)
        }
    }

    fn stable_bce(logit: f32, target: f32) -> f32 {
        logit.max(0.0) - logit * target + (1.0 + (-logit.abs()).exp()).ln()
    }
}

impl LossFn for BCEWithLogitsLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        let n = predictions.len() as f32;
        let total: f32 = predictions
            .data()
            .iter()
            .zip(targets.data().iter())
            .map(|(&logit, &target)| Self::stable_bce(logit, target))
            .sum::<f32>()
            / n;

        let mut loss = Tensor::from_vec(vec![total], true);

        if predictions.requires_grad() {
            let grad: Vec<f32> = predictions
                .data()
                .iter()
                .zip(targets.data().iter())
                .map(|(&logit, &target)| (Self::sigmoid(logit) - target) / n)
                .collect();

            loss.set_backward_op(Rc::new(BCEBackward {
                predictions: predictions.clone(),
                grad: Array1::from(grad),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "BCEWithLogits"
    }
}

struct BCEBackward {
    predictions: Tensor,
    grad: Array1<f32>,
}

impl BackwardOp for BCEBackward {
    fn backward(&self) {
        self.predictions.accumulate_grad(self.grad.clone());

        if let Some(op) = self.predictions.backward_op() {
            op.backward();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;
    use approx::assert_relative_eq;

    #[test]
    fn test_bce_confident_correct_is_small() {
        let loss_fn = BCEWithLogitsLoss;
        let logits = Tensor::from_vec(vec![10.0, -10.0], true);
        let targets = Tensor::from_vec(vec![1.0, 0.0], false);

        let loss = loss_fn.forward(&logits, &targets);
        assert!(loss.data()[0] < 1e-3);
    }

    #[test]
    fn test_bce_uncertain_is_ln2() {
        let loss_fn = BCEWithLogitsLoss;
        let logits = Tensor::from_vec(vec![0.0], true);
        let targets = Tensor::from_vec(vec![1.0], false);

        let loss = loss_fn.forward(&logits, &targets);
        assert_relative_eq!(loss.data()[0], std::f32::consts::LN_2, epsilon = 1e-5);
    }

    #[test]
    fn test_bce_gradient_sign() {
        let loss_fn = BCEWithLogitsLoss;
        let logits = Tensor::from_vec(vec![0.0, 0.0], true);
        let targets = Tensor::from_vec(vec![1.0, 0.0], false);

        let loss = loss_fn.forward(&logits, &targets);
        backward(&loss, None);

        let grad = logits.grad().unwrap();
        // Push the real logit up, the fake logit down
        assert!(grad[0] < 0.0);
        assert!(grad[1] > 0.0);
    }

    #[test]
    fn test_bce_extreme_logits_stable() {
        let loss_fn = BCEWithLogitsLoss;
        let logits = Tensor::from_vec(vec![1000.0, -1000.0], false);
        let targets = Tensor::from_vec(vec![0.0, 1.0], false);

        let loss = loss_fn.forward(&logits, &targets);
        assert!(loss.data()[0].is_finite());
    }
}
