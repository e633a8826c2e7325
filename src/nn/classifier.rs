//! Classifier architectures

use super::{BatchNorm, Conv2d, Linear, Module};
use crate::autograd::{ops, Conv2dSpec, Mode, Tensor};
use rand::rngs::StdRng;

/// Three-layer fully-connected classifier.
pub struct MlpClassifier {
    fc1: Linear,
    fc2: Linear,
    fc3: Linear,
}

impl MlpClassifier {
    /// Build for flattened inputs of `input_dim` elements
    pub fn new(input_dim: usize, hidden_dim: usize, classes: usize, rng: &mut StdRng) -> Self {
        let gain = 2.0f32.sqrt();
        Self {
            fc1: Linear::new(input_dim, hidden_dim, gain, rng),
            fc2: Linear::new(hidden_dim, hidden_dim / 2, gain, rng),
            fc3: Linear::new(hidden_dim / 2, classes, 1.0, rng),
        }
    }
}

impl Module for MlpClassifier {
    fn forward(&self, input: &Tensor, _mode: Mode) -> Tensor {
        let h = ops::relu(&self.fc1.forward(input));
        let h = ops::relu(&self.fc2.forward(&h));
        self.fc3.forward(&h)
    }

    fn parameters(&self) -> Vec<Tensor> {
        let mut params = self.fc1.parameters();
        params.extend(self.fc2.parameters());
        params.extend(self.fc3.parameters());
        params
    }
}

/// Two-block convolutional classifier for (in_c x 32 x 32) inputs.
///
/// Conv(stride 2) → BatchNorm → ReLU, twice, then a linear head.
pub struct CnnClassifier {
    conv1: Conv2d,
    bn1: BatchNorm,
    conv2: Conv2d,
    bn2: BatchNorm,
    fc: Linear,
}

impl CnnClassifier {
    /// Build for 32x32 inputs with `in_channels` channels
    pub fn new(in_channels: usize, classes: usize, rng: &mut StdRng) -> Self {
        let gain = 2.0f32.sqrt();
        let spec1 = Conv2dSpec {
            in_c: in_channels,
            in_h: 32,
            in_w: 32,
            out_c: 16,
            kernel: 3,
            stride: 2,
            padding: 1,
        };
        let spec2 = Conv2dSpec {
            in_c: 16,
            in_h: 16,
            in_w: 16,
            out_c: 32,
            kernel: 3,
            stride: 2,
            padding: 1,
        };
        Self {
            conv1: Conv2d::new(spec1, true, gain, rng),
            bn1: BatchNorm::new(16, 16 * 16),
            conv2: Conv2d::new(spec2, true, gain, rng),
            bn2: BatchNorm::new(32, 8 * 8),
            fc: Linear::new(32 * 8 * 8, classes, 1.0, rng),
        }
    }
}

impl Module for CnnClassifier {
    fn forward(&self, input: &Tensor, mode: Mode) -> Tensor {
        let h = ops::relu(&self.bn1.forward(&self.conv1.forward(input), mode));
        let h = ops::relu(&self.bn2.forward(&self.conv2.forward(&h), mode));
        self.fc.forward(&h)
    }

    fn parameters(&self) -> Vec<Tensor> {
        let mut params = self.conv1.parameters();
        params.extend(self.bn1.parameters());
        params.extend(self.conv2.parameters());
        params.extend(self.bn2.parameters());
        params.extend(self.fc.parameters());
        params
    }

    fn state(&self) -> Vec<Tensor> {
        let mut state = self.conv1.parameters();
        state.extend(self.bn1.state());
        state.extend(self.conv2.parameters());
        state.extend(self.bn2.state());
        state.extend(self.fc.parameters());
        state
    }
}
