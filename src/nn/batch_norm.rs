//! Batch normalization layer

use crate::autograd::{ops, Mode, Tensor};

/// Per-channel batch normalization.
///
/// Learnable scale/shift plus running statistics. The running buffers
/// are part of `state()` (they belong in checkpoints) but not of
/// `parameters()` (the optimizer never touches them).
pub struct BatchNorm {
    gamma: Tensor,
    beta: Tensor,
    running_mean: Tensor,
    running_var: Tensor,
    channels: usize,
    spatial: usize,
    momentum: f32,
    eps: f32,
}

impl BatchNorm {
    /// Create a layer normalizing `channels` channels of `spatial` elements each
    pub fn new(channels: usize, spatial: usize) -> Self {
        Self {
            gamma: Tensor::from_vec(vec![1.0; channels], true),
            beta: Tensor::zeros(channels, true),
            running_mean: Tensor::zeros(channels, false),
            running_var: Tensor::from_vec(vec![1.0; channels], false),
            channels,
            spatial,
            momentum: 0.1,
            eps: 1e-5,
        }
    }

    /// Forward pass; `mode` selects batch vs running statistics
    pub fn forward(&self, x: &Tensor, mode: Mode) -> Tensor {
        ops::batch_norm(
            x,
            &self.gamma,
            &self.beta,
            &self.running_mean,
            &self.running_var,
            self.channels,
            self.spatial,
            self.momentum,
            self.eps,
            mode,
        )
    }

    /// Learnable parameters
    pub fn parameters(&self) -> Vec<Tensor> {
        vec![self.gamma.clone(), self.beta.clone()]
    }

    /// Parameters plus running-statistic buffers
    pub fn state(&self) -> Vec<Tensor> {
        vec![
            self.gamma.clone(),
            self.beta.clone(),
            self.running_mean.clone(),
            self.running_var.clone(),
        ]
    }
}
