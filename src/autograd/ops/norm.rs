//! Per-channel batch normalization with explicit mode

use crate::autograd::{BackwardOp, Mode, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Batch normalization over (batch x channels x spatial) input.
///
/// In `Mode::Train` the batch statistics normalize the input and the
/// running statistics are updated in place with the given momentum.
/// In `Mode::Eval` the running statistics are used and nothing is
/// mutated, so repeated evaluation is idempotent.
#[allow(clippy::too_many_arguments)]
pub fn batch_norm(
    x: &Tensor,
    gamma: &Tensor,
    beta: &Tensor,
    running_mean: &Tensor,
    running_var: &Tensor,
    channels: usize,
    spatial: usize,
    momentum: f32,
    eps: f32,
    mode: Mode,
) -> Tensor {
    let batch = x.len() / (channels * spatial);
    debug_assert_eq!(x.len(), batch * channels * spatial);
    let n = (batch * spatial) as f32;

    // Statistics used for normalization this call
    let (mean, var) = if mode.is_train() {
        let mut mean = vec![0.0f32; channels];
        let mut var = vec![0.0f32; channels];
        {
            let x_data = x.data();
            let xs = x_data.as_slice().unwrap();
            for c in 0..channels {
                let mut sum = 0.0f32;
                for bi in 0..batch {
                    let base = (bi * channels + c) * spatial;
                    for &v in &xs[base..base + spatial] {
                        sum += v;
                    }
                }
                mean[c] = sum / n;

                let mut sq = 0.0f32;
                for bi in 0..batch {
                    let base = (bi * channels + c) * spatial;
                    for &v in &xs[base..base + spatial] {
                        let d = v - mean[c];
                        sq += d * d;
                    }
                }
                var[c] = sq / n;
            }
        }

        {
            let mut rm = running_mean.data_mut();
            let mut rv = running_var.data_mut();
            for c in 0..channels {
                rm[c] = (1.0 - momentum) * rm[c] + momentum * mean[c];
                rv[c] = (1.0 - momentum) * rv[c] + momentum * var[c];
            }
        }

        (mean, var)
    } else {
        (running_mean.to_vec(), running_var.to_vec())
    };

    let mut out = vec![0.0f32; x.len()];
    {
        let x_data = x.data();
        let xs = x_data.as_slice().unwrap();
        let g = gamma.data();
        let b = beta.data();
        for c in 0..channels {
            let inv_std = 1.0 / (var[c] + eps).sqrt();
            for bi in 0..batch {
                let base = (bi * channels + c) * spatial;
                for s in 0..spatial {
                    out[base + s] = g[c] * (xs[base + s] - mean[c]) * inv_std + b[c];
                }
            }
        }
    }

    let requires_grad = x.requires_grad() || gamma.requires_grad() || beta.requires_grad();
    let mut result = Tensor::new(Array1::from(out), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(BatchNormBackward {
            x: x.clone(),
            gamma: gamma.clone(),
            beta: beta.clone(),
            mean,
            var,
            channels,
            spatial,
            batch,
            eps,
            batch_stats: mode.is_train(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct BatchNormBackward {
    x: Tensor,
    gamma: Tensor,
    beta: Tensor,
    mean: Vec<f32>,
    var: Vec<f32>,
    channels: usize,
    spatial: usize,
    batch: usize,
    eps: f32,
    batch_stats: bool,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for BatchNormBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let dy = grad.as_slice().unwrap();
            let n = (self.batch * self.spatial) as f32;

            let mut dx = vec![0.0f32; dy.len()];
            let mut dgamma = vec![0.0f32; self.channels];
            let mut dbeta = vec![0.0f32; self.channels];

            {
                let x_data = self.x.data();
                let xs = x_data.as_slice().unwrap();
                let g = self.gamma.data();

                for c in 0..self.channels {
                    let inv_std = 1.0 / (self.var[c] + self.eps).sqrt();

                    let mut sum_dxhat = 0.0f32;
                    let mut sum_dxhat_xhat = 0.0f32;
                    for bi in 0..self.batch {
                        let base = (bi * self.channels + c) * self.spatial;
                        for s in 0..self.spatial {
                            let xhat = (xs[base + s] - self.mean[c]) * inv_std;
                            let d = dy[base + s];
                            dgamma[c] += d * xhat;
                            dbeta[c] += d;
                            sum_dxhat += d * g[c];
                            sum_dxhat_xhat += d * g[c] * xhat;
                        }
                    }

                    for bi in 0..self.batch {
                        let base = (bi * self.channels + c) * self.spatial;
                        for s in 0..self.spatial {
                            let dxhat = dy[base + s] * g[c];
                            dx[base + s] = if self.batch_stats {
                                let xhat = (xs[base + s] - self.mean[c]) * inv_std;
                                inv_std / n
                                    * (n * dxhat - sum_dxhat - xhat * sum_dxhat_xhat)
                            } else {
                                // Running statistics are constants
                                dxhat * inv_std
                            };
                        }
                    }
                }
            }

            if self.x.requires_grad() {
                self.x.accumulate_grad(Array1::from(dx));
            }
            if self.gamma.requires_grad() {
                self.gamma.accumulate_grad(Array1::from(dgamma));
            }
            if self.beta.requires_grad() {
                self.beta.accumulate_grad(Array1::from(dbeta));
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
        }
    }
}
