//! Model structure for serialization

use crate::autograd::Tensor;
use crate::error::{Error, Result};
use crate::nn::Module;
use serde::{Deserialize, Serialize};

/// Model metadata stored alongside the weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Run name (derived from the run configuration)
    pub name: String,

    /// Architecture tag (e.g. "mlp", "cnn", "generator")
    pub architecture: String,

    /// Format version
    pub version: String,
}

impl ModelMetadata {
    /// Create new metadata
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
            version: "0.1.0".to_string(),
        }
    }
}

/// Information about a model parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,

    /// Parameter shape
    pub shape: Vec<usize>,

    /// Data type
    pub dtype: String,

    /// Whether this parameter requires gradients
    pub requires_grad: bool,
}

/// Serializable model state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Parameter information
    pub parameters: Vec<ParameterInfo>,

    /// Flattened parameter data
    pub data: Vec<f32>,
}

/// High-level model abstraction for I/O
pub struct Model {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Model parameters
    pub parameters: Vec<(String, Tensor)>,
}

impl Model {
    /// Create a new model
    pub fn new(metadata: ModelMetadata, parameters: Vec<(String, Tensor)>) -> Self {
        Self {
            metadata,
            parameters,
        }
    }

    /// Get parameter by name
    pub fn get_parameter(&self, name: &str) -> Option<&Tensor> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    /// Convert model to serializable state
    pub fn to_state(&self) -> ModelState {
        let mut data = Vec::new();
        let parameters: Vec<ParameterInfo> = self
            .parameters
            .iter()
            .map(|(name, tensor)| {
                let shape = vec![tensor.len()];
                data.extend_from_slice(tensor.data().as_slice().unwrap());

                ParameterInfo {
                    name: name.clone(),
                    shape,
                    dtype: "f32".to_string(),
                    requires_grad: tensor.requires_grad(),
                }
            })
            .collect();

        ModelState {
            metadata: self.metadata.clone(),
            parameters,
            data,
        }
    }

    /// Create model from serializable state
    pub fn from_state(state: ModelState) -> Result<Self> {
        let expected: usize = state
            .parameters
            .iter()
            .map(|p| p.shape.iter().product::<usize>())
            .sum();
        if expected != state.data.len() {
            return Err(Error::Serialization(format!(
                "state declares {expected} elements but carries {}",
                state.data.len()
            )));
        }

        let mut data_offset = 0;
        let parameters: Vec<(String, Tensor)> = state
            .parameters
            .into_iter()
            .map(|param_info| {
                let size: usize = param_info.shape.iter().product();
                let param_data = state.data[data_offset..data_offset + size].to_vec();
                data_offset += size;

                let tensor = Tensor::from_vec(param_data, param_info.requires_grad);
                (param_info.name, tensor)
            })
            .collect();

        Ok(Self {
            metadata: state.metadata,
            parameters,
        })
    }
}

/// Snapshot a module's checkpoint state as a serializable model.
///
/// Tensors are deep-copied, so the snapshot is stable even if training
/// continues afterwards.
pub fn snapshot(name: &str, architecture: &str, module: &dyn Module) -> Model {
    let parameters = module
        .state()
        .iter()
        .enumerate()
        .map(|(i, t)| (format!("param{i}"), t.detach()))
        .collect();
    Model::new(ModelMetadata::new(name, architecture), parameters)
}

/// Copy a saved model's tensors back into a module, in snapshot order.
pub fn restore(module: &dyn Module, saved: &Model) -> Result<()> {
    let state = module.state();
    if state.len() != saved.parameters.len() {
        return Err(Error::Shape(format!(
            "module has {} state tensors but checkpoint has {}",
            state.len(),
            saved.parameters.len()
        )));
    }

    for (target, (name, source)) in state.iter().zip(saved.parameters.iter()) {
        if target.len() != source.len() {
            return Err(Error::Shape(format!(
                "{name}: expected {} elements, got {}",
                target.len(),
                source.len()
            )));
        }
        target.data_mut().assign(&*source.data());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::MlpClassifier;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_model_metadata_creation() {
        let meta = ModelMetadata::new("cnn_adv", "cnn");
        assert_eq!(meta.name, "cnn_adv");
        assert_eq!(meta.architecture, "cnn");
        assert_eq!(meta.version, "0.1.0");
    }

    #[test]
    fn test_model_state_round_trip() {
        let params = vec![
            ("weight".to_string(), Tensor::from_vec(vec![1.0, 2.0, 3.0], true)),
            ("bias".to_string(), Tensor::from_vec(vec![0.1], false)),
        ];

        let original = Model::new(ModelMetadata::new("test", "linear"), params);
        let state = original.to_state();
        let restored = Model::from_state(state).unwrap();

        assert_eq!(original.metadata.name, restored.metadata.name);
        assert_eq!(original.parameters.len(), restored.parameters.len());

        let orig = original.get_parameter("weight").unwrap();
        let rest = restored.get_parameter("weight").unwrap();
        assert_eq!(orig.to_vec(), rest.to_vec());
    }

    #[test]
    fn test_from_state_rejects_truncated_data() {
        let state = ModelState {
            metadata: ModelMetadata::new("test", "linear"),
            parameters: vec![ParameterInfo {
                name: "w".to_string(),
                shape: vec![5],
                dtype: "f32".to_string(),
                requires_grad: true,
            }],
            data: vec![1.0, 2.0],
        };
        assert!(Model::from_state(state).is_err());
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut rng = StdRng::seed_from_u64(0);
        let source = MlpClassifier::new(8, 4, 2, &mut rng);
        let target = MlpClassifier::new(8, 4, 2, &mut rng);

        let saved = snapshot("run", "mlp", &source);
        restore(&target, &saved).unwrap();

        for (a, b) in source.state().iter().zip(target.state().iter()) {
            assert_eq!(a.to_vec(), b.to_vec());
        }
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut rng = StdRng::seed_from_u64(0);
        let model = MlpClassifier::new(4, 4, 2, &mut rng);

        let saved = snapshot("run", "mlp", &model);
        let before = saved.parameters[0].1.to_vec();

        // Mutate the live model; the snapshot must not move
        model.parameters()[0].data_mut()[0] += 1.0;
        assert_eq!(saved.parameters[0].1.to_vec(), before);
    }

    #[test]
    fn test_restore_rejects_mismatched_module() {
        let mut rng = StdRng::seed_from_u64(0);
        let source = MlpClassifier::new(8, 4, 2, &mut rng);
        let target = MlpClassifier::new(16, 4, 2, &mut rng);

        let saved = snapshot("run", "mlp", &source);
        assert!(restore(&target, &saved).is_err());
    }
}
