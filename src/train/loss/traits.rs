//! Loss function trait

use crate::autograd::Tensor;

/// Trait for loss functions
pub trait LossFn {
    /// Compute a scalar loss given predictions and targets
    ///
    /// Returns a one-element tensor and sets up gradients for
    /// backpropagation into the predictions.
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor;

    /// Name of the loss function
    fn name(&self) -> &'static str;
}
