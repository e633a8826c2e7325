//! Batched affine transform: y = x·W + b

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Transpose a row-major matrix (rows x cols) to (cols x rows)
///
/// Uses a cache-blocked transpose for large matrices.
#[inline]
pub fn transpose(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut transposed = vec![0.0f32; rows * cols];

    const BLOCK_SIZE: usize = 32;
    if rows >= BLOCK_SIZE && cols >= BLOCK_SIZE {
        transpose_blocked(data, &mut transposed, rows, cols, BLOCK_SIZE);
    } else {
        transpose_simple(data, &mut transposed, rows, cols);
    }

    transposed
}

#[inline]
fn transpose_blocked(src: &[f32], dst: &mut [f32], rows: usize, cols: usize, block: usize) {
    for r_block in (0..rows).step_by(block) {
        for c_block in (0..cols).step_by(block) {
            let r_end = (r_block + block).min(rows);
            let c_end = (c_block + block).min(cols);
            for r in r_block..r_end {
                for c in c_block..c_end {
                    dst[c * rows + r] = src[r * cols + c];
                }
            }
        }
    }
}

#[inline]
fn transpose_simple(src: &[f32], dst: &mut [f32], rows: usize, cols: usize) {
    for r in 0..rows {
        for c in 0..cols {
            dst[c * rows + r] = src[r * cols + c];
        }
    }
}

/// Row-major matrix product: (m x k) · (k x n) -> (m x n)
fn gemm(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; m * n];
    for i in 0..m {
        for p in 0..k {
            let a_ip = a[i * k + p];
            if a_ip == 0.0 {
                continue;
            }
            let b_row = &b[p * n..(p + 1) * n];
            let out_row = &mut out[i * n..(i + 1) * n];
            for (o, &bv) in out_row.iter_mut().zip(b_row.iter()) {
                *o += a_ip * bv;
            }
        }
    }
    out
}

/// Batched affine transform.
///
/// `x` is (batch x in_dim) row-major, `w` is (in_dim x out_dim) row-major,
/// `b` is (out_dim). Result is (batch x out_dim).
pub fn linear(x: &Tensor, w: &Tensor, b: &Tensor, batch: usize, in_dim: usize, out_dim: usize) -> Tensor {
    debug_assert_eq!(x.len(), batch * in_dim);
    debug_assert_eq!(w.len(), in_dim * out_dim);
    debug_assert_eq!(b.len(), out_dim);

    let mut out = {
        let x_data = x.data();
        let w_data = w.data();
        let xs = x_data.as_slice().unwrap();
        let ws = w_data.as_slice().unwrap();
        gemm(xs, ws, batch, in_dim, out_dim)
    };
    {
        let b_data = b.data();
        for row in out.chunks_mut(out_dim) {
            for (o, &bias) in row.iter_mut().zip(b_data.iter()) {
                *o += bias;
            }
        }
    }

    let requires_grad = x.requires_grad() || w.requires_grad() || b.requires_grad();
    let mut result = Tensor::new(Array1::from(out), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(LinearBackward {
            x: x.clone(),
            w: w.clone(),
            b: b.clone(),
            batch,
            in_dim,
            out_dim,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct LinearBackward {
    x: Tensor,
    w: Tensor,
    b: Tensor,
    batch: usize,
    in_dim: usize,
    out_dim: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for LinearBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let dy = grad.as_slice().unwrap();

            if self.x.requires_grad() {
                // ∂L/∂x = dy · Wᵀ
                let w_data = self.w.data();
                let wt = transpose(w_data.as_slice().unwrap(), self.in_dim, self.out_dim);
                let dx = gemm(dy, &wt, self.batch, self.out_dim, self.in_dim);
                self.x.accumulate_grad(Array1::from(dx));
            }

            if self.w.requires_grad() {
                // ∂L/∂W = xᵀ · dy
                let x_data = self.x.data();
                let xt = transpose(x_data.as_slice().unwrap(), self.batch, self.in_dim);
                let dw = gemm(&xt, dy, self.in_dim, self.batch, self.out_dim);
                self.w.accumulate_grad(Array1::from(dw));
            }

            if self.b.requires_grad() {
                // ∂L/∂b = column sums of dy
                let mut db = vec![0.0f32; self.out_dim];
                for row in dy.chunks(self.out_dim) {
                    for (d, &g) in db.iter_mut().zip(row.iter()) {
                        *d += g;
                    }
                }
                self.b.accumulate_grad(Array1::from(db));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    #[test]
    fn test_transpose_round_trip() {
        let m = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3
        let t = transpose(&m, 2, 3);
        assert_eq!(t, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        let back = transpose(&t, 3, 2);
        assert_eq!(back, m);
    }

    #[test]
    fn test_linear_forward() {
        // batch=1, in=2, out=2: y = x·W + b
        let x = Tensor::from_vec(vec![1.0, 2.0], false);
        let w = Tensor::from_vec(vec![1.0, 0.0, 0.0, 1.0], false); // identity
        let b = Tensor::from_vec(vec![0.5, -0.5], false);

        let y = linear(&x, &w, &b, 1, 2, 2);
        assert_relative_eq!(y.data()[0], 1.5);
        assert_relative_eq!(y.data()[1], 1.5);
    }

    #[test]
    fn test_linear_batched_forward() {
        // batch=2, in=2, out=1: y = x0 + 2*x1
        let x = Tensor::from_vec(vec![1.0, 1.0, 2.0, 3.0], false);
        let w = Tensor::from_vec(vec![1.0, 2.0], false);
        let b = Tensor::from_vec(vec![0.0], false);

        let y = linear(&x, &w, &b, 2, 2, 1);
        assert_relative_eq!(y.data()[0], 3.0);
        assert_relative_eq!(y.data()[1], 8.0);
    }

    #[test]
    fn test_linear_backward_gradients() {
        let x = Tensor::from_vec(vec![1.0, 2.0], true);
        let w = Tensor::from_vec(vec![3.0, 4.0], true); // in=2, out=1
        let b = Tensor::from_vec(vec![0.0], true);

        let y = linear(&x, &w, &b, 1, 2, 1);
        backward(&y, Some(arr1(&[1.0])));

        // dx = dy · Wᵀ = [3, 4]
        let dx = x.grad().unwrap();
        assert_relative_eq!(dx[0], 3.0);
        assert_relative_eq!(dx[1], 4.0);

        // dW = xᵀ · dy = [1, 2]
        let dw = w.grad().unwrap();
        assert_relative_eq!(dw[0], 1.0);
        assert_relative_eq!(dw[1], 2.0);

        // db = sum(dy) = 1
        let db = b.grad().unwrap();
        assert_relative_eq!(db[0], 1.0);
    }

    #[test]
    fn test_linear_batch_bias_gradient_sums_rows() {
        let x = Tensor::from_vec(vec![1.0, 1.0], false);
        let w = Tensor::from_vec(vec![1.0], false);
        let b = Tensor::from_vec(vec![0.0], true);

        let y = linear(&x, &w, &b, 2, 1, 1);
        backward(&y, Some(arr1(&[1.0, 1.0])));

        let db = b.grad().unwrap();
        assert_relative_eq!(db[0], 2.0);
    }
}
