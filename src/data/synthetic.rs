//! Synthetic blob dataset for demos and tests

use super::ImageDataset;
use rand::rngs::StdRng;
use rand::Rng;

/// Generate a dataset of class-dependent Gaussian blob images.
///
/// Each class places a bright blob at a distinct horizontal position;
/// pixel noise keeps examples distinct. Values land in [-1, 1], the
/// model input range.
pub fn synthetic_blobs(
    n: usize,
    classes: usize,
    shape: (usize, usize, usize),
    rng: &mut StdRng,
) -> ImageDataset {
    let (c, h, w) = shape;
    let sigma = w as f32 / 6.0;

    let mut images = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);

    for i in 0..n {
        let label = i % classes;
        let cx = w as f32 * (2 * label + 1) as f32 / (2 * classes) as f32;
        let cy = h as f32 / 2.0;

        let mut img = Vec::with_capacity(c * h * w);
        for _ in 0..c {
            for y in 0..h {
                for x in 0..w {
                    let dx = x as f32 + 0.5 - cx;
                    let dy = y as f32 + 0.5 - cy;
                    let blob = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
                    let noise = rng.random_range(-0.1..0.1);
                    img.push((2.0 * blob - 1.0 + noise).clamp(-1.0, 1.0));
                }
            }
        }
        images.push(img);
        labels.push(label);
    }

    // Shapes were constructed consistently above
    ImageDataset::new(images, labels, shape).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_synthetic_blobs_shape_and_range() {
        let mut rng = StdRng::seed_from_u64(0);
        let ds = synthetic_blobs(20, 4, (1, 8, 8), &mut rng);

        assert_eq!(ds.len(), 20);
        assert_eq!(ds.example_len(), 64);
        for i in 0..ds.len() {
            assert!(ds.image(i).iter().all(|&v| (-1.0..=1.0).contains(&v)));
            assert!(ds.label(i) < 4);
        }
    }

    #[test]
    fn test_synthetic_blobs_classes_cycle() {
        let mut rng = StdRng::seed_from_u64(0);
        let ds = synthetic_blobs(6, 3, (1, 4, 4), &mut rng);
        assert_eq!(
            (0..6).map(|i| ds.label(i)).collect::<Vec<_>>(),
            vec![0, 1, 2, 0, 1, 2]
        );
    }

    #[test]
    fn test_synthetic_blobs_classes_differ() {
        let mut rng = StdRng::seed_from_u64(0);
        let ds = synthetic_blobs(2, 2, (1, 8, 8), &mut rng);

        // Different classes put the blob in different places
        let diff: f32 = ds
            .image(0)
            .iter()
            .zip(ds.image(1).iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(diff > 1.0);
    }
}
