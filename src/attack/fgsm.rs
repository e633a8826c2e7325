//! Fast Gradient Sign Method

use crate::autograd::{backward, Mode, Tensor};
use crate::error::{Error, Result};
use crate::nn::Module;
use crate::train::{Batch, CrossEntropyLoss, LossFn};

/// Single-step gradient-sign attack under an L-infinity budget.
///
/// Untargeted and white-box: one gradient evaluation of the loss with
/// respect to the *input* produces the adversarial example
/// `clamp(x + ε·sign(∇ₓ L), lo, hi)`. The model is only read; any
/// parameter gradients deposited by the backward pass are cleared
/// before returning, so perturbation is a pure function of
/// (model, input, labels, ε).
pub struct Fgsm {
    epsilon: f32,
    clamp_min: f32,
    clamp_max: f32,
}

impl Fgsm {
    /// Create an attack with the given budget; inputs clamp to [-1, 1]
    pub fn new(epsilon: f32) -> Result<Self> {
        if epsilon < 0.0 {
            return Err(Error::Config(format!(
                "epsilon must be non-negative, got {epsilon}"
            )));
        }
        Ok(Self {
            epsilon,
            clamp_min: -1.0,
            clamp_max: 1.0,
        })
    }

    /// Override the valid input range
    pub fn with_clamp(mut self, min: f32, max: f32) -> Self {
        self.clamp_min = min;
        self.clamp_max = max;
        self
    }

    /// The perturbation budget
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Produce a perturbed copy of the batch inputs.
    ///
    /// The forward pass runs in training mode so normalization layers
    /// see the same statistics the surrounding training steps do. The
    /// returned tensor does not track gradients.
    pub fn perturb(&self, model: &dyn Module, batch: &Batch) -> Tensor {
        // Fresh leaf over the same values, with input-gradient tracking
        let inputs = Tensor::new(batch.inputs.data().clone(), true);

        let logits = model.forward(&inputs, Mode::Train);
        let loss = CrossEntropyLoss::mean().forward(&logits, &batch.targets);
        backward(&loss, None);

        let perturbed = match inputs.grad() {
            Some(grad) => {
                let inputs = inputs.data();
                inputs
                    .iter()
                    .zip(grad.iter())
                    .map(|(&x, &g)| {
                        (x + self.epsilon * sign(g)).clamp(self.clamp_min, self.clamp_max)
                    })
                    .collect()
            }
            None => inputs.to_vec(),
        };

        // The backward pass also deposited parameter gradients; drop
        // them so the model is left exactly as found.
        model.zero_grad();

        Tensor::from_vec(perturbed, false)
    }
}

/// Sign with sign(0) = 0
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
