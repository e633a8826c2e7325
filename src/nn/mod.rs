//! Neural network layers and architectures
//!
//! Architectures are plain structs implementing [`Module`]; the forward
//! mode is an explicit argument, so layers with mode-dependent behavior
//! (batch normalization) never carry hidden mutable flags.

mod batch_norm;
mod classifier;
mod conv;
mod gan;
mod init;
mod linear;
mod spectral;

pub use batch_norm::BatchNorm;
pub use classifier::{CnnClassifier, MlpClassifier};
pub use conv::Conv2d;
pub use gan::{Discriminator, Generator};
pub use init::xavier_uniform;
pub use linear::Linear;
pub use spectral::SpectralNorm;

use crate::autograd::{Mode, Tensor};

/// Capability set of a trainable architecture.
pub trait Module {
    /// Compute logits (or generator output) for a flattened input batch
    fn forward(&self, input: &Tensor, mode: Mode) -> Tensor;

    /// Learnable parameters as shared handles
    fn parameters(&self) -> Vec<Tensor>;

    /// Everything that belongs in a checkpoint: learnable parameters
    /// plus persistent buffers (running statistics)
    fn state(&self) -> Vec<Tensor> {
        self.parameters()
    }

    /// Clear gradients on all learnable parameters
    fn zero_grad(&self) {
        for p in self.parameters() {
            p.zero_grad();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    struct Identity {
        w: Tensor,
    }

    impl Module for Identity {
        fn forward(&self, input: &Tensor, _mode: Mode) -> Tensor {
            input.clone()
        }

        fn parameters(&self) -> Vec<Tensor> {
            vec![self.w.clone()]
        }
    }

    #[test]
    fn test_zero_grad_clears_parameters() {
        let m = Identity {
            w: Tensor::from_vec(vec![1.0], true),
        };
        m.parameters()[0].set_grad(arr1(&[2.0]));
        assert!(m.parameters()[0].grad().is_some());

        m.zero_grad();
        assert!(m.parameters()[0].grad().is_none());
    }

    #[test]
    fn test_state_defaults_to_parameters() {
        let m = Identity {
            w: Tensor::from_vec(vec![1.0], true),
        };
        assert_eq!(m.state().len(), m.parameters().len());
    }
}
