//! Checkpoint round-trip through the convolutional path

use endurecer::attack::Fgsm;
use endurecer::data::{synthetic_blobs, BatchLoader};
use endurecer::eval::{evaluate, evaluate_under_attack};
use endurecer::io::{load_model, restore};
use endurecer::nn::{CnnClassifier, Module};
use endurecer::optim::SGD;
use endurecer::train::{CheckpointSpec, FitOptions, TrainConfig, Trainer};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn trained_cnn_restores_to_identical_evaluation() {
    let mut rng = StdRng::seed_from_u64(21);
    let train = synthetic_blobs(40, 2, (1, 32, 32), &mut rng);
    let test = synthetic_blobs(20, 2, (1, 32, 32), &mut rng);
    let train_loader = BatchLoader::new(train, 10, true).unwrap();
    let test_loader = BatchLoader::new(test, 10, false).unwrap();

    let model = CnnClassifier::new(1, 2, &mut rng);
    let mut trainer = Trainer::new(
        model.parameters(),
        Box::new(SGD::new(0.02, 0.5)),
        TrainConfig::new().with_log_interval(10_000),
    );

    let dir = tempfile::tempdir().unwrap();
    let spec = CheckpointSpec {
        dir: dir.path().to_path_buf(),
        name: "cnn".to_string(),
        architecture: "cnn".to_string(),
    };
    let ckpt_path = spec.path();
    let opts = FitOptions {
        epochs: 1,
        seed: 3,
        attack: None,
        checkpoint: Some(spec),
    };
    trainer.fit(&model, &train_loader, &test_loader, &opts).unwrap();
    assert!(ckpt_path.exists());

    // Restore into a fresh network; batch-norm running statistics ride
    // along in the state, so evaluation matches exactly
    let mut fresh_rng = StdRng::seed_from_u64(999);
    let restored = CnnClassifier::new(1, 2, &mut fresh_rng);
    let saved = load_model(&ckpt_path).unwrap();
    restore(&restored, &saved).unwrap();

    let mut eval_rng = StdRng::seed_from_u64(0);
    let original_report = evaluate(&model, test_loader.batches(&mut eval_rng), 20);
    let restored_report = evaluate(&restored, test_loader.batches(&mut eval_rng), 20);

    assert_eq!(original_report.correct, restored_report.correct);
    assert_eq!(
        original_report.mean_loss.to_bits(),
        restored_report.mean_loss.to_bits()
    );
}

#[test]
fn robustness_evaluation_runs_on_cnn() {
    let mut rng = StdRng::seed_from_u64(4);
    let test = synthetic_blobs(20, 2, (1, 32, 32), &mut rng);
    let loader = BatchLoader::new(test, 10, false).unwrap();
    let model = CnnClassifier::new(1, 2, &mut rng);

    let attack = Fgsm::new(0.3).unwrap();
    let mut eval_rng = StdRng::seed_from_u64(0);
    let report = evaluate_under_attack(&model, &attack, loader.batches(&mut eval_rng), 20);

    assert!(report.correct <= 20);
    assert!(report.mean_loss.is_finite());
}
