//! endurecer — adversarial training for small image classifiers and GANs
//!
//! Trains MNIST-scale image classifiers and DC-style GANs, hardens
//! classifiers with FGSM adversarial training (one clean and one
//! perturbed update per batch), and evaluates robustness under the
//! same attack. Built on a tape-based autograd engine over flat f32
//! tensors.
//!
//! # Example
//!
//! ```no_run
//! use endurecer::attack::Fgsm;
//! use endurecer::data::{synthetic_blobs, BatchLoader};
//! use endurecer::nn::{MlpClassifier, Module};
//! use endurecer::optim::SGD;
//! use endurecer::train::{FitOptions, TrainConfig, Trainer};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let train = BatchLoader::new(synthetic_blobs(1000, 10, (1, 32, 32), &mut rng), 64, true)?;
//! let test = BatchLoader::new(synthetic_blobs(200, 10, (1, 32, 32), &mut rng), 256, false)?;
//!
//! let model = MlpClassifier::new(1024, 256, 10, &mut rng);
//! let mut trainer = Trainer::new(
//!     model.parameters(),
//!     Box::new(SGD::new(0.01, 0.5)),
//!     TrainConfig::new(),
//! );
//! let opts = FitOptions {
//!     epochs: 10,
//!     seed: 1,
//!     attack: Some(Fgsm::new(0.3)?),
//!     checkpoint: None,
//! };
//! let result = trainer.fit(&model, &train, &test, &opts)?;
//! println!("best: {}", result.best_correct);
//! # Ok::<(), endurecer::Error>(())
//! ```

pub mod attack;
pub mod autograd;
pub mod cli;
pub mod data;
pub mod error;
pub mod eval;
pub mod gan;
pub mod io;
pub mod nn;
pub mod optim;
pub mod train;

pub use attack::Fgsm;
pub use autograd::{backward, Mode, Tensor};
pub use error::{Error, Result};
pub use nn::Module;
