//! Batch loader

use super::ImageDataset;
use crate::autograd::Tensor;
use crate::error::{Error, Result};
use crate::train::Batch;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Produces one pass of batches over a dataset.
///
/// Training loaders reshuffle the example order on every call from the
/// caller's RNG; evaluation loaders keep stored order, so repeated
/// passes are identical. The final short batch is emitted.
pub struct BatchLoader {
    dataset: ImageDataset,
    batch_size: usize,
    shuffle: bool,
}

impl BatchLoader {
    /// Create a loader over a dataset
    pub fn new(dataset: ImageDataset, batch_size: usize, shuffle: bool) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Config("batch size must be positive".to_string()));
        }
        Ok(Self {
            dataset,
            batch_size,
            shuffle,
        })
    }

    /// One pass of batches, in (possibly shuffled) example order
    pub fn batches(&self, rng: &mut StdRng) -> Vec<Batch> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            indices.shuffle(rng);
        }

        indices
            .chunks(self.batch_size)
            .map(|chunk| {
                let mut inputs = Vec::with_capacity(chunk.len() * self.dataset.example_len());
                let mut targets = Vec::with_capacity(chunk.len());
                for &i in chunk {
                    inputs.extend_from_slice(self.dataset.image(i));
                    targets.push(self.dataset.label(i) as f32);
                }
                Batch::new(
                    Tensor::from_vec(inputs, false),
                    Tensor::from_vec(targets, false),
                )
            })
            .collect()
    }

    /// Total number of examples in the underlying dataset
    pub fn num_examples(&self) -> usize {
        self.dataset.len()
    }

    /// Configured batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The underlying dataset
    pub fn dataset(&self) -> &ImageDataset {
        &self.dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn dataset(n: usize) -> ImageDataset {
        let images = (0..n).map(|i| vec![i as f32; 4]).collect();
        let labels = (0..n).map(|i| i % 2).collect();
        ImageDataset::new(images, labels, (1, 2, 2)).unwrap()
    }

    #[test]
    fn test_loader_emits_final_short_batch() {
        let loader = BatchLoader::new(dataset(10), 4, false).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let batches = loader.batches(&mut rng);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].size(), 4);
        assert_eq!(batches[2].size(), 2);
    }

    #[test]
    fn test_unshuffled_loader_is_stable() {
        let loader = BatchLoader::new(dataset(6), 3, false).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let a = loader.batches(&mut rng);
        let b = loader.batches(&mut rng);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.inputs.to_vec(), y.inputs.to_vec());
            assert_eq!(x.targets.to_vec(), y.targets.to_vec());
        }
    }

    #[test]
    fn test_shuffled_loader_deterministic_for_seed() {
        let loader = BatchLoader::new(dataset(16), 4, true).unwrap();

        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let a = loader.batches(&mut rng1);
        let b = loader.batches(&mut rng2);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.inputs.to_vec(), y.inputs.to_vec());
        }
    }

    #[test]
    fn test_shuffled_loader_covers_every_example() {
        let loader = BatchLoader::new(dataset(9), 2, true).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let total: usize = loader.batches(&mut rng).iter().map(Batch::size).sum();
        assert_eq!(total, 9);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(BatchLoader::new(dataset(4), 0, false).is_err());
    }
}
