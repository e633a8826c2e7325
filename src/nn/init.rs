//! Weight initialization

use rand::rngs::StdRng;
use rand::Rng;

/// Xavier-uniform initialization with the given gain.
///
/// Samples uniformly from ±gain·√(6 / (fan_in + fan_out)).
pub fn xavier_uniform(
    len: usize,
    fan_in: usize,
    fan_out: usize,
    gain: f32,
    rng: &mut StdRng,
) -> Vec<f32> {
    let limit = gain * (6.0 / (fan_in + fan_out) as f32).sqrt();
    (0..len).map(|_| rng.random_range(-limit..limit)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_xavier_uniform_within_limit() {
        let mut rng = StdRng::seed_from_u64(7);
        let w = xavier_uniform(1000, 64, 32, 1.0, &mut rng);
        let limit = (6.0 / 96.0f32).sqrt();
        assert!(w.iter().all(|&v| v.abs() <= limit));
    }

    #[test]
    fn test_xavier_uniform_deterministic_for_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(
            xavier_uniform(16, 4, 4, 1.0, &mut a),
            xavier_uniform(16, 4, 4, 1.0, &mut b)
        );
    }
}
