//! Nearest-neighbor 2x upsampling

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Nearest-neighbor upsampling by a factor of two.
///
/// Input is (batch x channels x h x w) row-major; each pixel is repeated
/// into a 2x2 block. Backward sums the gradients of the four children.
pub fn upsample2x(x: &Tensor, channels: usize, h: usize, w: usize) -> Tensor {
    let plane = channels * h * w;
    let batch = x.len() / plane;
    debug_assert_eq!(x.len(), batch * plane);

    let (oh, ow) = (2 * h, 2 * w);
    let mut out = vec![0.0f32; batch * channels * oh * ow];
    {
        let x_data = x.data();
        let xs = x_data.as_slice().unwrap();
        for bi in 0..batch {
            for c in 0..channels {
                for y in 0..h {
                    for xx in 0..w {
                        let v = xs[((bi * channels + c) * h + y) * w + xx];
                        let base = (bi * channels + c) * oh;
                        out[(base + 2 * y) * ow + 2 * xx] = v;
                        out[(base + 2 * y) * ow + 2 * xx + 1] = v;
                        out[(base + 2 * y + 1) * ow + 2 * xx] = v;
                        out[(base + 2 * y + 1) * ow + 2 * xx + 1] = v;
                    }
                }
            }
        }
    }

    let requires_grad = x.requires_grad();
    let mut result = Tensor::new(Array1::from(out), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(Upsample2xBackward {
            x: x.clone(),
            channels,
            h,
            w,
            batch,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct Upsample2xBackward {
    x: Tensor,
    channels: usize,
    h: usize,
    w: usize,
    batch: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for Upsample2xBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.x.requires_grad() {
                let dy = grad.as_slice().unwrap();
                let (oh, ow) = (2 * self.h, 2 * self.w);
                let mut dx = vec![0.0f32; self.batch * self.channels * self.h * self.w];
                for bi in 0..self.batch {
                    for c in 0..self.channels {
                        for y in 0..self.h {
                            for xx in 0..self.w {
                                let base = (bi * self.channels + c) * oh;
                                let sum = dy[(base + 2 * y) * ow + 2 * xx]
                                    + dy[(base + 2 * y) * ow + 2 * xx + 1]
                                    + dy[(base + 2 * y + 1) * ow + 2 * xx]
                                    + dy[(base + 2 * y + 1) * ow + 2 * xx + 1];
                                dx[((bi * self.channels + c) * self.h + y) * self.w + xx] = sum;
                            }
                        }
                    }
                }
                self.x.accumulate_grad(Array1::from(dx));
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
        }
    }
}
