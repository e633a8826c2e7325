//! Fully-connected layer

use super::{xavier_uniform, SpectralNorm};
use crate::autograd::{ops, Tensor};
use rand::rngs::StdRng;

/// Fully-connected layer: y = x·W + b.
///
/// Weight layout is (in_features x out_features) row-major.
pub struct Linear {
    weight: Tensor,
    bias: Tensor,
    in_features: usize,
    out_features: usize,
    spectral: Option<SpectralNorm>,
}

impl Linear {
    /// Create a layer with Xavier-uniform weights and zero bias
    pub fn new(in_features: usize, out_features: usize, gain: f32, rng: &mut StdRng) -> Self {
        let weight = Tensor::from_vec(
            xavier_uniform(in_features * out_features, in_features, out_features, gain, rng),
            true,
        );
        let bias = Tensor::zeros(out_features, true);
        Self {
            weight,
            bias,
            in_features,
            out_features,
            spectral: None,
        }
    }

    /// Apply spectral normalization to the weight
    pub fn with_spectral_norm(mut self) -> Self {
        self.spectral = Some(SpectralNorm::new(self.in_features));
        self
    }

    /// Forward pass over a (batch x in_features) input
    pub fn forward(&self, x: &Tensor) -> Tensor {
        let batch = x.len() / self.in_features;
        let weight = match &self.spectral {
            Some(sn) => sn.apply(&self.weight, self.in_features, self.out_features),
            None => self.weight.clone(),
        };
        ops::linear(x, &weight, &self.bias, batch, self.in_features, self.out_features)
    }

    /// Learnable parameters
    pub fn parameters(&self) -> Vec<Tensor> {
        vec![self.weight.clone(), self.bias.clone()]
    }

    /// Input width
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Output width
    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;
    use rand::SeedableRng;

    #[test]
    fn test_linear_layer_shapes() {
        let mut rng = StdRng::seed_from_u64(0);
        let layer = Linear::new(4, 3, 1.0, &mut rng);

        let x = Tensor::zeros(8, false); // batch of 2
        let y = layer.forward(&x);
        assert_eq!(y.len(), 6);
        assert_eq!(layer.parameters().len(), 2);
    }

    #[test]
    fn test_linear_layer_gradient_flow() {
        let mut rng = StdRng::seed_from_u64(0);
        let layer = Linear::new(2, 2, 1.0, &mut rng);

        let x = Tensor::from_vec(vec![1.0, -1.0], false);
        let y = layer.forward(&x);
        backward(&y, None);

        for p in layer.parameters() {
            assert!(p.grad().is_some());
        }
    }

    #[test]
    fn test_spectral_linear_still_differentiable() {
        let mut rng = StdRng::seed_from_u64(1);
        let layer = Linear::new(3, 2, 1.0, &mut rng).with_spectral_norm();

        let x = Tensor::from_vec(vec![0.5, 0.5, 0.5], false);
        let y = layer.forward(&x);
        backward(&y, None);

        assert!(layer.parameters()[0].grad().is_some());
    }
}
