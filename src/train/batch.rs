//! Batch data structure

use crate::autograd::Tensor;

/// A training batch containing inputs and integer class targets.
///
/// Targets store class indices as f32 values, one per example.
#[derive(Clone)]
pub struct Batch {
    /// Flattened input features, batch-major
    pub inputs: Tensor,
    /// Target class labels
    pub targets: Tensor,
}

impl Batch {
    /// Create a new batch
    pub fn new(inputs: Tensor, targets: Tensor) -> Self {
        Self { inputs, targets }
    }

    /// Number of examples (length of targets)
    pub fn size(&self) -> usize {
        self.targets.len()
    }

    /// Targets as class indices
    pub fn labels(&self) -> Vec<usize> {
        self.targets.data().iter().map(|&t| t as usize).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_creation() {
        let inputs = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], false);
        let targets = Tensor::from_vec(vec![0.0, 1.0], false);

        let batch = Batch::new(inputs, targets);
        assert_eq!(batch.size(), 2);
        assert_eq!(batch.labels(), vec![0, 1]);
    }
}
