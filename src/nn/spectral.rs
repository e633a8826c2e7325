//! Spectral normalization of layer weights

use crate::autograd::{ops, Tensor};
use std::cell::RefCell;

/// Spectral normalization state for one weight matrix.
///
/// Estimates the top singular value σ of the weight (viewed as a
/// rows x cols matrix) with one power-iteration step per forward pass
/// and rescales the weight to W/σ, bounding the layer's Lipschitz
/// constant. The left singular vector estimate `u` persists across
/// steps and is never serialized.
pub struct SpectralNorm {
    u: RefCell<Vec<f32>>,
}

impl SpectralNorm {
    /// Create spectral-norm state for a weight with the given row count
    pub fn new(rows: usize) -> Self {
        let init = 1.0 / (rows as f32).sqrt();
        Self {
            u: RefCell::new(vec![init; rows]),
        }
    }

    /// One power-iteration step, returning the weight scaled by 1/σ.
    ///
    /// σ is treated as a constant in backward: gradients flow through
    /// the rescaled weight as a plain scale.
    pub fn apply(&self, weight: &Tensor, rows: usize, cols: usize) -> Tensor {
        debug_assert_eq!(weight.len(), rows * cols);

        let sigma = {
            let w_data = weight.data();
            let ws = w_data.as_slice().unwrap();
            let mut u = self.u.borrow_mut();

            // v = normalize(Wᵀ u)
            let mut v = vec![0.0f32; cols];
            for r in 0..rows {
                let row = &ws[r * cols..(r + 1) * cols];
                for (vc, &wv) in v.iter_mut().zip(row.iter()) {
                    *vc += wv * u[r];
                }
            }
            normalize(&mut v);

            // u = W v; σ = ‖W v‖
            let mut nu = vec![0.0f32; rows];
            for r in 0..rows {
                let row = &ws[r * cols..(r + 1) * cols];
                nu[r] = row.iter().zip(v.iter()).map(|(&wv, &vv)| wv * vv).sum();
            }
            let sigma = l2_norm(&nu);
            if sigma > 0.0 {
                for x in nu.iter_mut() {
                    *x /= sigma;
                }
                *u = nu;
            }
            sigma
        };

        if sigma > 0.0 {
            ops::scale(weight, 1.0 / sigma)
        } else {
            weight.clone()
        }
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
