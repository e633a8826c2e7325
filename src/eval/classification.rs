//! Classification evaluation over a held-out set

use crate::attack::Fgsm;
use crate::autograd::{Mode, Tensor};
use crate::nn::Module;
use crate::train::{Batch, CrossEntropyLoss, LossFn};

/// Aggregate evaluation outcome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvalReport {
    /// Summed cross-entropy divided by the dataset size
    pub mean_loss: f32,
    /// Predictions whose arg-max class equals the true label
    pub correct: usize,
    /// Dataset size
    pub total: usize,
}

impl EvalReport {
    /// Fraction of correct predictions
    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f32 / self.total as f32
        }
    }
}

/// Evaluate a model over a fixed batch sequence.
///
/// Runs every batch exactly once in stored order with evaluation-mode
/// forward passes; no backward pass is invoked and no model or
/// optimizer state is touched, so repeated calls yield identical
/// reports. Loss accumulates with sum reduction and is divided by the
/// dataset size.
pub fn evaluate(model: &dyn Module, batches: Vec<Batch>, dataset_size: usize) -> EvalReport {
    let loss_fn = CrossEntropyLoss::sum();
    let mut total_loss = 0.0;
    let mut correct = 0;

    for batch in &batches {
        let output = model.forward(&batch.inputs, Mode::Eval);
        let loss = loss_fn.forward(&output, &batch.targets);
        total_loss += loss.data()[0];
        correct += count_correct(&output, &batch.targets);
    }

    EvalReport {
        mean_loss: if dataset_size > 0 {
            total_loss / dataset_size as f32
        } else {
            0.0
        },
        correct,
        total: dataset_size,
    }
}

/// Evaluate with every batch FGSM-perturbed first.
///
/// Measures robustness: the attack sees the same model it is evaluating.
pub fn evaluate_under_attack(
    model: &dyn Module,
    attack: &Fgsm,
    batches: Vec<Batch>,
    dataset_size: usize,
) -> EvalReport {
    let perturbed: Vec<Batch> = batches
        .iter()
        .map(|batch| Batch::new(attack.perturb(model, batch), batch.targets.clone()))
        .collect();
    evaluate(model, perturbed, dataset_size)
}

/// Count rows whose arg-max logit matches the label
fn count_correct(logits: &Tensor, targets: &Tensor) -> usize {
    let batch = targets.len();
    if batch == 0 {
        return 0;
    }
    let classes = logits.len() / batch;
    let logits = logits.data();
    let rows = logits.as_slice().unwrap();
    let targets = targets.data();

    rows.chunks(classes)
        .zip(targets.iter())
        .filter(|(row, &label)| {
            let pred = row
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(i, _)| i)
                .unwrap_or(0);
            pred == label as usize
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{synthetic_blobs, BatchLoader};
    use crate::nn::MlpClassifier;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn eval_setup() -> (MlpClassifier, Vec<Batch>, usize) {
        let mut rng = StdRng::seed_from_u64(2);
        let model = MlpClassifier::new(16, 8, 2, &mut rng);
        let ds = synthetic_blobs(12, 2, (1, 4, 4), &mut rng);
        let loader = BatchLoader::new(ds, 5, false).unwrap();
        let batches = loader.batches(&mut rng);
        (model, batches, 12)
    }

    #[test]
    fn test_count_correct_argmax() {
        let logits = Tensor::from_vec(vec![0.1, 0.9, 0.8, 0.2], false);
        let targets = Tensor::from_vec(vec![1.0, 0.0], false);
        assert_eq!(count_correct(&logits, &targets), 2);

        let wrong = Tensor::from_vec(vec![0.0, 1.0], false);
        assert_eq!(count_correct(&logits, &wrong), 1);
    }

    #[test]
    fn test_evaluate_bounds() {
        let (model, batches, n) = eval_setup();
        let report = evaluate(&model, batches, n);

        assert!(report.correct <= n);
        assert!(report.mean_loss.is_finite());
        assert!(report.mean_loss > 0.0);
        assert!((0.0..=1.0).contains(&report.accuracy()));
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let (model, batches, n) = eval_setup();

        let a = evaluate(&model, batches.clone(), n);
        let b = evaluate(&model, batches, n);
        assert_eq!(a, b);
    }

    #[test]
    fn test_evaluate_does_not_touch_gradients() {
        let (model, batches, n) = eval_setup();
        evaluate(&model, batches, n);
        for p in model.parameters() {
            assert!(p.grad().is_none());
        }
    }

    #[test]
    fn test_evaluate_under_attack_not_better_than_clean() {
        let (model, batches, n) = eval_setup();
        let attack = Fgsm::new(0.5).unwrap();

        let clean = evaluate(&model, batches.clone(), n);
        let attacked = evaluate_under_attack(&model, &attack, batches, n);
        // FGSM maximizes the loss, so attacked loss can only grow
        assert!(attacked.mean_loss >= clean.mean_loss - 1e-4);
    }

    #[test]
    fn test_evaluate_empty_dataset() {
        let mut rng = StdRng::seed_from_u64(0);
        let model = MlpClassifier::new(4, 4, 2, &mut rng);
        let report = evaluate(&model, vec![], 0);
        assert_eq!(report.correct, 0);
        assert_eq!(report.mean_loss, 0.0);
        assert_eq!(report.accuracy(), 0.0);
    }
}
