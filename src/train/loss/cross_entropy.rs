//! Cross-entropy loss for multi-class classification

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

use super::LossFn;

/// How per-example losses are combined into the scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reduction {
    /// Batch mean — used for training updates
    Mean,
    /// Plain sum — used when accumulating evaluation loss over a dataset
    Sum,
}

/// Cross-entropy over batched logits with integer-label targets.
///
/// `predictions` is (batch x classes) row-major; `targets` holds one
/// class index per example. Gradient w.r.t. the logits is
/// `softmax(logits) − onehot(target)` per row, scaled by 1/batch under
/// mean reduction.
pub struct CrossEntropyLoss {
    reduction: Reduction,
}

impl CrossEntropyLoss {
    /// Batch-mean reduction
    pub fn mean() -> Self {
        Self {
            reduction: Reduction::Mean,
        }
    }

    /// Sum reduction
    pub fn sum() -> Self {
        Self {
            reduction: Reduction::Sum,
        }
    }

    /// Numerically stable softmax over one row of logits
    pub(crate) fn softmax_row(row: &[f32]) -> Vec<f32> {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let exp: Vec<f32> = row.iter().map(|&v| (v - max).exp()).collect();
        let sum: f32 = exp.iter().sum();
        exp.into_iter().map(|e| e / sum).collect()
    }
}

impl LossFn for CrossEntropyLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        let batch = targets.len();
        assert!(batch > 0, "Empty batch");
        assert!(
            predictions.len() % batch == 0,
            "Predictions length must be a multiple of batch size"
        );
        let classes = predictions.len() / batch;

        let mut total = 0.0f32;
        let mut grad = vec![0.0f32; predictions.len()];
        {
            let preds = predictions.data();
            let rows = preds.as_slice().unwrap();
            let targets = targets.data();
            for (bi, row) in rows.chunks(classes).enumerate() {
                let label = targets[bi] as usize;
                assert!(label < classes, "Label {label} out of range");

                let probs = Self::softmax_row(row);
                total -= probs[label].max(f32::MIN_POSITIVE).ln();

                let base = bi * classes;
                for (c, &p) in probs.iter().enumerate() {
                    grad[base + c] = p;
                }
                grad[base + label] -= 1.0;
            }
        }

        if self.reduction == Reduction::Mean {
            total /= batch as f32;
            for g in grad.iter_mut() {
                *g /= batch as f32;
            }
        }

        let mut loss = Tensor::from_vec(vec![total], true);

        if predictions.requires_grad() {
            loss.set_backward_op(Rc::new(CrossEntropyBackward {
                predictions: predictions.clone(),
                grad: Array1::from(grad),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "CrossEntropy"
    }
}

struct CrossEntropyBackward {
    predictions: Tensor,
    grad: Array1<f32>,
}

impl BackwardOp for CrossEntropyBackward {
    fn backward(&self) {
        self.predictions.accumulate_grad(self.grad.clone());

        if let Some(op) = self.predictions.backward_op() {
            op.backward();
        }
    }
}
