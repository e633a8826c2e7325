//! Autograd operations
//!
//! Each op computes its forward result eagerly and, when any input
//! requires gradients, attaches a backward node capturing the inputs
//! and the result's gradient cell.

mod activations;
mod basic;
mod conv;
mod linear;
mod norm;
mod upsample;

pub use activations::{leaky_relu, relu, tanh};
pub use basic::scale;
pub use conv::{conv2d, Conv2dSpec};
pub use linear::{linear, transpose};
pub use norm::batch_norm;
pub use upsample::upsample2x;
