//! DC-style generator and discriminator for 32x32 images

use super::{BatchNorm, Conv2d, Linear, Module};
use crate::autograd::{ops, Conv2dSpec, Mode, Tensor};
use rand::rngs::StdRng;

const LEAKY_SLOPE: f32 = 0.2;

fn conv_spec(in_c: usize, in_hw: usize, out_c: usize, stride: usize) -> Conv2dSpec {
    Conv2dSpec {
        in_c,
        in_h: in_hw,
        in_w: in_hw,
        out_c,
        kernel: 3,
        stride,
        padding: 1,
    }
}

/// Upsampling generator: latent vector to a (out_c x 32 x 32) image in [-1, 1].
///
/// Upsample-then-convolve stages stand in for transposed convolutions;
/// a final tanh pins the output to the model input range.
pub struct Generator {
    latent_dim: usize,
    dim: usize,
    fc: Linear,
    bn0: BatchNorm,
    conv1: Conv2d,
    bn1: BatchNorm,
    conv2: Conv2d,
    bn2: BatchNorm,
    conv3: Conv2d,
}

impl Generator {
    /// Build with base channel width `dim` (channels run 4·dim down to out_c)
    pub fn new(latent_dim: usize, out_c: usize, dim: usize, apply_sn: bool, rng: &mut StdRng) -> Self {
        let gain = 2.0f32.sqrt();
        let fc = Linear::new(latent_dim, 4 * dim * 4 * 4, 1.0, rng);
        let conv1 = Conv2d::new(conv_spec(4 * dim, 8, 2 * dim, 1), false, gain, rng);
        let conv2 = Conv2d::new(conv_spec(2 * dim, 16, dim, 1), false, gain, rng);
        let conv3 = Conv2d::new(conv_spec(dim, 32, out_c, 1), false, 1.0, rng);

        let (fc, conv1, conv2, conv3) = if apply_sn {
            (
                fc.with_spectral_norm(),
                conv1.with_spectral_norm(),
                conv2.with_spectral_norm(),
                conv3.with_spectral_norm(),
            )
        } else {
            (fc, conv1, conv2, conv3)
        };

        Self {
            latent_dim,
            dim,
            fc,
            bn0: BatchNorm::new(4 * dim, 4 * 4),
            conv1,
            bn1: BatchNorm::new(2 * dim, 8 * 8),
            conv2,
            bn2: BatchNorm::new(dim, 16 * 16),
            conv3,
        }
    }

    /// Width of the latent input
    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }
}

impl Module for Generator {
    fn forward(&self, input: &Tensor, mode: Mode) -> Tensor {
        // 4x4 seed plane from the latent vector
        let h = ops::relu(&self.bn0.forward(&self.fc.forward(input), mode));
        let h = ops::upsample2x(&h, 4 * self.dim, 4, 4);
        let h = ops::relu(&self.bn1.forward(&self.conv1.forward(&h), mode));
        let h = ops::upsample2x(&h, 2 * self.dim, 8, 8);
        let h = ops::relu(&self.bn2.forward(&self.conv2.forward(&h), mode));
        let h = ops::upsample2x(&h, self.dim, 16, 16);
        ops::tanh(&self.conv3.forward(&h))
    }

    fn parameters(&self) -> Vec<Tensor> {
        let mut params = self.fc.parameters();
        params.extend(self.bn0.parameters());
        params.extend(self.conv1.parameters());
        params.extend(self.bn1.parameters());
        params.extend(self.conv2.parameters());
        params.extend(self.bn2.parameters());
        params.extend(self.conv3.parameters());
        params
    }

    fn state(&self) -> Vec<Tensor> {
        let mut state = self.fc.parameters();
        state.extend(self.bn0.state());
        state.extend(self.conv1.parameters());
        state.extend(self.bn1.state());
        state.extend(self.conv2.parameters());
        state.extend(self.bn2.state());
        state.extend(self.conv3.parameters());
        state
    }
}

/// Strided-convolution discriminator producing one logit per example.
///
/// No batch normalization (unstable under the real/fake split); leaky
/// ReLU activations and optional spectral normalization throughout.
pub struct Discriminator {
    conv1: Conv2d,
    conv2: Conv2d,
    conv3: Conv2d,
    fc: Linear,
}

impl Discriminator {
    /// Build for (in_c x 32 x 32) inputs with base channel width `dim`
    pub fn new(in_c: usize, dim: usize, apply_sn: bool, rng: &mut StdRng) -> Self {
        let gain = 2.0f32.sqrt();
        let conv1 = Conv2d::new(conv_spec(in_c, 32, dim, 2), false, gain, rng);
        let conv2 = Conv2d::new(conv_spec(dim, 16, 2 * dim, 2), false, gain, rng);
        let conv3 = Conv2d::new(conv_spec(2 * dim, 8, 4 * dim, 2), false, gain, rng);
        let fc = Linear::new(4 * dim * 4 * 4, 1, 1.0, rng);

        let (conv1, conv2, conv3, fc) = if apply_sn {
            (
                conv1.with_spectral_norm(),
                conv2.with_spectral_norm(),
                conv3.with_spectral_norm(),
                fc.with_spectral_norm(),
            )
        } else {
            (conv1, conv2, conv3, fc)
        };

        Self {
            conv1,
            conv2,
            conv3,
            fc,
        }
    }
}

impl Module for Discriminator {
    fn forward(&self, input: &Tensor, _mode: Mode) -> Tensor {
        let h = ops::leaky_relu(&self.conv1.forward(input), LEAKY_SLOPE);
        let h = ops::leaky_relu(&self.conv2.forward(&h), LEAKY_SLOPE);
        let h = ops::leaky_relu(&self.conv3.forward(&h), LEAKY_SLOPE);
        self.fc.forward(&h)
    }

    fn parameters(&self) -> Vec<Tensor> {
        let mut params = self.conv1.parameters();
        params.extend(self.conv2.parameters());
        params.extend(self.conv3.parameters());
        params.extend(self.fc.parameters());
        params
    }
}
