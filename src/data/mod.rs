//! Datasets and batch loading

mod dataset;
mod loader;
mod synthetic;

pub use dataset::ImageDataset;
pub use loader::BatchLoader;
pub use synthetic::synthetic_blobs;
