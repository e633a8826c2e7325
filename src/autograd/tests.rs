//! Property tests for the autograd engine

use super::*;
use proptest::prelude::*;

proptest! {
    /// Scaling then backward yields the scale factor as gradient everywhere
    #[test]
    fn prop_scale_gradient_is_factor(
        values in prop::collection::vec(-100.0f32..100.0, 1..32),
        factor in -10.0f32..10.0,
    ) {
        let a = Tensor::from_vec(values, true);
        let out = scale(&a, factor);
        backward(&out, None);

        let grad = a.grad().unwrap();
        for &g in grad.iter() {
            prop_assert!((g - factor).abs() < 1e-5);
        }
    }

    /// ReLU output is non-negative and gradients vanish where input <= 0
    #[test]
    fn prop_relu_forward_backward(
        values in prop::collection::vec(-10.0f32..10.0, 1..32),
    ) {
        let a = Tensor::from_vec(values.clone(), true);
        let out = relu(&a);
        for &y in out.data().iter() {
            prop_assert!(y >= 0.0);
        }

        backward(&out, None);
        let grad = a.grad().unwrap();
        for (i, &x) in values.iter().enumerate() {
            if x <= 0.0 {
                prop_assert!(grad[i] == 0.0);
            } else {
                prop_assert!((grad[i] - 1.0).abs() < 1e-6);
            }
        }
    }

    /// A linear map through the engine matches a hand-computed product
    #[test]
    fn prop_linear_matches_reference(
        x in prop::collection::vec(-5.0f32..5.0, 4),
        w in prop::collection::vec(-5.0f32..5.0, 4),
    ) {
        // batch=2, in=2, out=2
        let xt = Tensor::from_vec(x.clone(), false);
        let wt = Tensor::from_vec(w.clone(), false);
        let bt = Tensor::zeros(2, false);
        let y = linear(&xt, &wt, &bt, 2, 2, 2);

        for bi in 0..2 {
            for o in 0..2 {
                let expected = x[bi * 2] * w[o] + x[bi * 2 + 1] * w[2 + o];
                prop_assert!((y.data()[bi * 2 + o] - expected).abs() < 1e-3);
            }
        }
    }
}

#[test]
fn test_backward_seeds_ones_for_scalar_loss() {
    let a = Tensor::from_vec(vec![2.0, 3.0], true);
    let out = scale(&a, 2.0);
    backward(&out, None);

    // Seed of ones propagated through the scale
    let grad = a.grad().unwrap();
    assert_eq!(grad[0], 2.0);
    assert_eq!(grad[1], 2.0);
}

#[test]
fn test_backward_with_explicit_seed() {
    let a = Tensor::from_vec(vec![1.0], true);
    let out = scale(&a, 1.0);
    backward(&out, Some(ndarray::arr1(&[5.0])));
    assert_eq!(a.grad().unwrap()[0], 5.0);
}
