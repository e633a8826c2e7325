//! 2-D convolution with stride and zero padding

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Geometry of a conv2d application.
///
/// Input is (batch x in_c x in_h x in_w) row-major, kernel is
/// (out_c x in_c x k x k) row-major.
#[derive(Clone, Copy, Debug)]
pub struct Conv2dSpec {
    pub in_c: usize,
    pub in_h: usize,
    pub in_w: usize,
    pub out_c: usize,
    pub kernel: usize,
    pub stride: usize,
    pub padding: usize,
}

impl Conv2dSpec {
    /// Output height
    pub fn out_h(&self) -> usize {
        (self.in_h + 2 * self.padding - self.kernel) / self.stride + 1
    }

    /// Output width
    pub fn out_w(&self) -> usize {
        (self.in_w + 2 * self.padding - self.kernel) / self.stride + 1
    }

    fn in_len(&self) -> usize {
        self.in_c * self.in_h * self.in_w
    }

    fn out_len(&self) -> usize {
        self.out_c * self.out_h() * self.out_w()
    }
}

/// 2-D convolution over a batched input.
///
/// `bias` is optional (generator/discriminator convs run without one).
pub fn conv2d(x: &Tensor, w: &Tensor, bias: Option<&Tensor>, spec: &Conv2dSpec) -> Tensor {
    let batch = x.len() / spec.in_len();
    debug_assert_eq!(x.len(), batch * spec.in_len());
    debug_assert_eq!(w.len(), spec.out_c * spec.in_c * spec.kernel * spec.kernel);

    let (out_h, out_w) = (spec.out_h(), spec.out_w());
    let mut out = vec![0.0f32; batch * spec.out_len()];

    {
        let x_data = x.data();
        let w_data = w.data();
        let xs = x_data.as_slice().unwrap();
        let ws = w_data.as_slice().unwrap();

        for bi in 0..batch {
            for oc in 0..spec.out_c {
                for oy in 0..out_h {
                    for ox in 0..out_w {
                        let mut acc = 0.0f32;
                        for ic in 0..spec.in_c {
                            for ky in 0..spec.kernel {
                                let iy = (oy * spec.stride + ky) as isize - spec.padding as isize;
                                if iy < 0 || iy >= spec.in_h as isize {
                                    continue;
                                }
                                for kx in 0..spec.kernel {
                                    let ix =
                                        (ox * spec.stride + kx) as isize - spec.padding as isize;
                                    if ix < 0 || ix >= spec.in_w as isize {
                                        continue;
                                    }
                                    let xi = ((bi * spec.in_c + ic) * spec.in_h + iy as usize)
                                        * spec.in_w
                                        + ix as usize;
                                    let wi =
                                        ((oc * spec.in_c + ic) * spec.kernel + ky) * spec.kernel
                                            + kx;
                                    acc += xs[xi] * ws[wi];
                                }
                            }
                        }
                        out[((bi * spec.out_c + oc) * out_h + oy) * out_w + ox] = acc;
                    }
                }
            }
        }

        if let Some(b) = bias {
            let b_data = b.data();
            for bi in 0..batch {
                for oc in 0..spec.out_c {
                    let base = (bi * spec.out_c + oc) * out_h * out_w;
                    for v in &mut out[base..base + out_h * out_w] {
                        *v += b_data[oc];
                    }
                }
            }
        }
    }

    let requires_grad = x.requires_grad()
        || w.requires_grad()
        || bias.map(Tensor::requires_grad).unwrap_or(false);
    let mut result = Tensor::new(Array1::from(out), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(Conv2dBackward {
            x: x.clone(),
            w: w.clone(),
            bias: bias.cloned(),
            spec: *spec,
            batch,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct Conv2dBackward {
    x: Tensor,
    w: Tensor,
    bias: Option<Tensor>,
    spec: Conv2dSpec,
    batch: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for Conv2dBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let spec = &self.spec;
            let (out_h, out_w) = (spec.out_h(), spec.out_w());
            let dy = grad.as_slice().unwrap();

            let need_dx = self.x.requires_grad();
            let need_dw = self.w.requires_grad();
            let need_db = self.bias.as_ref().map(Tensor::requires_grad).unwrap_or(false);

            let mut dx = if need_dx {
                vec![0.0f32; self.batch * spec.in_len()]
            } else {
                Vec::new()
            };
            let mut dw = if need_dw {
                vec![0.0f32; spec.out_c * spec.in_c * spec.kernel * spec.kernel]
            } else {
                Vec::new()
            };
            let mut db = if need_db {
                vec![0.0f32; spec.out_c]
            } else {
                Vec::new()
            };

            {
                let x_data = self.x.data();
                let w_data = self.w.data();
                let xs = x_data.as_slice().unwrap();
                let ws = w_data.as_slice().unwrap();

                for bi in 0..self.batch {
                    for oc in 0..spec.out_c {
                        for oy in 0..out_h {
                            for ox in 0..out_w {
                                let g = dy[((bi * spec.out_c + oc) * out_h + oy) * out_w + ox];
                                if g == 0.0 {
                                    continue;
                                }
                                if need_db {
                                    db[oc] += g;
                                }
                                if !need_dx && !need_dw {
                                    continue;
                                }
                                for ic in 0..spec.in_c {
                                    for ky in 0..spec.kernel {
                                        let iy = (oy * spec.stride + ky) as isize
                                            - spec.padding as isize;
                                        if iy < 0 || iy >= spec.in_h as isize {
                                            continue;
                                        }
                                        for kx in 0..spec.kernel {
                                            let ix = (ox * spec.stride + kx) as isize
                                                - spec.padding as isize;
                                            if ix < 0 || ix >= spec.in_w as isize {
                                                continue;
                                            }
                                            let xi = ((bi * spec.in_c + ic) * spec.in_h
                                                + iy as usize)
                                                * spec.in_w
                                                + ix as usize;
                                            let wi = ((oc * spec.in_c + ic) * spec.kernel + ky)
                                                * spec.kernel
                                                + kx;
                                            if need_dx {
                                                dx[xi] += g * ws[wi];
                                            }
                                            if need_dw {
                                                dw[wi] += g * xs[xi];
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            if need_dx {
                self.x.accumulate_grad(Array1::from(dx));
            }
            if need_dw {
                self.w.accumulate_grad(Array1::from(dw));
            }
            if need_db {
                if let Some(b) = &self.bias {
                    b.accumulate_grad(Array1::from(db));
                }
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
            if let Some(op) = self.w.backward_op() {
                op.backward();
            }
        }
    }
}
