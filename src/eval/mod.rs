//! Model evaluation

mod classification;

pub use classification::{evaluate, evaluate_under_attack, EvalReport};
