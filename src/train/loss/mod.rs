//! Loss functions

mod bce_with_logits;
mod cross_entropy;
mod traits;

pub use bce_with_logits::BCEWithLogitsLoss;
pub use cross_entropy::{CrossEntropyLoss, Reduction};
pub use traits::LossFn;
