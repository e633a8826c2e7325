//! Adversarial example attacks

mod fgsm;

pub use fgsm::Fgsm;
