//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::autograd::Tensor;
use ndarray::Array1;

/// SGD with optional momentum.
///
/// Update rule: `v ← momentum·v + grad; param ← param − lr·v`.
/// Velocity buffers are allocated lazily, one per parameter, and live
/// only in memory for the duration of the run.
pub struct SGD {
    lr: f32,
    momentum: f32,
    velocities: Vec<Option<Array1<f32>>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            velocities: Vec::new(),
        }
    }

    /// Initialize velocities if needed
    fn ensure_velocities(&mut self, params: &[Tensor]) {
        if self.velocities.is_empty() {
            self.velocities = params.iter().map(|_| None).collect();
        }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [Tensor]) {
        self.ensure_velocities(params);

        for (i, param) in params.iter_mut().enumerate() {
            if let Some(grad) = param.grad() {
                if self.momentum > 0.0 {
                    // v = momentum * v + grad
                    let velocity = match &self.velocities[i] {
                        Some(v) => v * self.momentum + &grad,
                        None => grad.clone(),
                    };

                    for (d, v) in param.data_mut().iter_mut().zip(velocity.iter()) {
                        *d -= self.lr * v;
                    }
                    self.velocities[i] = Some(velocity);
                } else {
                    // param -= lr * grad
                    for (d, g) in param.data_mut().iter_mut().zip(grad.iter()) {
                        *d -= self.lr * g;
                    }
                }
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}
