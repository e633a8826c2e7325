//! In-memory image dataset

use crate::error::{Error, Result};

/// A labeled set of fixed-size images.
///
/// Images are stored flat, one `Vec<f32>` per example, values already
/// normalized to the model input range [-1, 1].
pub struct ImageDataset {
    images: Vec<Vec<f32>>,
    labels: Vec<usize>,
    shape: (usize, usize, usize),
}

impl ImageDataset {
    /// Create a dataset; every image must match `shape` = (channels, h, w)
    pub fn new(
        images: Vec<Vec<f32>>,
        labels: Vec<usize>,
        shape: (usize, usize, usize),
    ) -> Result<Self> {
        if images.len() != labels.len() {
            return Err(Error::Shape(format!(
                "{} images but {} labels",
                images.len(),
                labels.len()
            )));
        }
        let expected = shape.0 * shape.1 * shape.2;
        for (i, img) in images.iter().enumerate() {
            if img.len() != expected {
                return Err(Error::Shape(format!(
                    "image {i} has {} elements, expected {expected}",
                    img.len()
                )));
            }
        }
        Ok(Self {
            images,
            labels,
            shape,
        })
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if the dataset has no examples
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image shape as (channels, height, width)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.shape
    }

    /// Elements per example
    pub fn example_len(&self) -> usize {
        self.shape.0 * self.shape.1 * self.shape.2
    }

    /// Pixels of example `i`
    pub fn image(&self, i: usize) -> &[f32] {
        &self.images[i]
    }

    /// Label of example `i`
    pub fn label(&self, i: usize) -> usize {
        self.labels[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_creation() {
        let ds = ImageDataset::new(vec![vec![0.0; 4]; 3], vec![0, 1, 0], (1, 2, 2)).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.example_len(), 4);
        assert_eq!(ds.label(1), 1);
    }

    #[test]
    fn test_dataset_rejects_length_mismatch() {
        let err = ImageDataset::new(vec![vec![0.0; 4]], vec![0, 1], (1, 2, 2));
        assert!(err.is_err());
    }

    #[test]
    fn test_dataset_rejects_bad_image_size() {
        let err = ImageDataset::new(vec![vec![0.0; 3]], vec![0], (1, 2, 2));
        assert!(err.is_err());
    }
}
