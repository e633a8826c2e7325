//! High-level training loop
//!
//! Loss functions, batches, metrics, callbacks, and the trainer that
//! drives clean and adversarial updates.

mod batch;
pub mod callback;
mod config;
mod loss;
mod trainer;

pub use batch::Batch;
pub use callback::{
    CallbackAction, CallbackContext, CallbackManager, ProgressCallback, TrainerCallback,
};
pub use config::{MetricsTracker, TrainConfig};
pub use loss::{BCEWithLogitsLoss, CrossEntropyLoss, LossFn, Reduction};
pub use trainer::{CheckpointSpec, FitOptions, FitResult, Trainer};
