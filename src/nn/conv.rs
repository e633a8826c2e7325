//! Convolutional layer

use super::{xavier_uniform, SpectralNorm};
use crate::autograd::{ops, Conv2dSpec, Tensor};
use rand::rngs::StdRng;

/// 2-D convolutional layer over fixed-size inputs.
///
/// The full input geometry lives in the spec because tensors are flat;
/// each layer knows the spatial extent it consumes.
pub struct Conv2d {
    weight: Tensor,
    bias: Option<Tensor>,
    spec: Conv2dSpec,
    spectral: Option<SpectralNorm>,
}

impl Conv2d {
    /// Create a layer with Xavier-uniform weights
    pub fn new(spec: Conv2dSpec, with_bias: bool, gain: f32, rng: &mut StdRng) -> Self {
        let fan_in = spec.in_c * spec.kernel * spec.kernel;
        let fan_out = spec.out_c * spec.kernel * spec.kernel;
        let weight = Tensor::from_vec(
            xavier_uniform(spec.out_c * fan_in, fan_in, fan_out, gain, rng),
            true,
        );
        let bias = with_bias.then(|| Tensor::zeros(spec.out_c, true));
        Self {
            weight,
            bias,
            spec,
            spectral: None,
        }
    }

    /// Apply spectral normalization to the kernel
    pub fn with_spectral_norm(mut self) -> Self {
        self.spectral = Some(SpectralNorm::new(self.spec.out_c));
        self
    }

    /// Forward pass over a flattened (batch x in_c x in_h x in_w) input
    pub fn forward(&self, x: &Tensor) -> Tensor {
        let weight = match &self.spectral {
            Some(sn) => {
                let cols = self.spec.in_c * self.spec.kernel * self.spec.kernel;
                sn.apply(&self.weight, self.spec.out_c, cols)
            }
            None => self.weight.clone(),
        };
        ops::conv2d(x, &weight, self.bias.as_ref(), &self.spec)
    }

    /// Learnable parameters
    pub fn parameters(&self) -> Vec<Tensor> {
        let mut params = vec![self.weight.clone()];
        if let Some(b) = &self.bias {
            params.push(b.clone());
        }
        params
    }

    /// Layer geometry
    pub fn spec(&self) -> &Conv2dSpec {
        &self.spec
    }

    /// Output elements per example
    pub fn out_len(&self) -> usize {
        self.spec.out_c * self.spec.out_h() * self.spec.out_w()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn small_spec() -> Conv2dSpec {
        Conv2dSpec {
            in_c: 1,
            in_h: 8,
            in_w: 8,
            out_c: 4,
            kernel: 3,
            stride: 2,
            padding: 1,
        }
    }

    #[test]
    fn test_conv_layer_output_size() {
        let mut rng = StdRng::seed_from_u64(0);
        let layer = Conv2d::new(small_spec(), true, 1.0, &mut rng);

        let x = Tensor::zeros(64, false);
        let y = layer.forward(&x);
        assert_eq!(y.len(), layer.out_len());
        assert_eq!(layer.out_len(), 4 * 4 * 4);
    }

    #[test]
    fn test_conv_layer_without_bias() {
        let mut rng = StdRng::seed_from_u64(0);
        let layer = Conv2d::new(small_spec(), false, 1.0, &mut rng);
        assert_eq!(layer.parameters().len(), 1);
    }

    #[test]
    fn test_conv_layer_spectral_norm_output_finite() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = Conv2d::new(small_spec(), false, 1.0, &mut rng).with_spectral_norm();

        let x = Tensor::from_vec(vec![0.5; 64], false);
        let y = layer.forward(&x);
        assert!(y.data().iter().all(|v| v.is_finite()));
    }
}
