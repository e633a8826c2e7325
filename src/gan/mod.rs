//! Generative adversarial training
//!
//! Alternating per-batch updates: the discriminator on (real, fake)
//! with binary cross-entropy, then the generator through the
//! discriminator score. Both reuse the zero/forward/backward/step
//! sequencing of the classifier trainer.

use crate::autograd::{backward, Mode, Tensor};
use crate::nn::{Discriminator, Generator, Module};
use crate::optim::Optimizer;
use crate::train::{BCEWithLogitsLoss, Batch, LossFn};
use rand::rngs::StdRng;
use rand::Rng;

/// Drives alternating generator/discriminator updates.
pub struct GanTrainer {
    generator: Generator,
    discriminator: Discriminator,
    g_params: Vec<Tensor>,
    d_params: Vec<Tensor>,
    g_opt: Box<dyn Optimizer>,
    d_opt: Box<dyn Optimizer>,
    loss_fn: BCEWithLogitsLoss,
}

impl GanTrainer {
    /// Take ownership of the pair and build one optimizer per network
    pub fn new(
        generator: Generator,
        discriminator: Discriminator,
        g_opt: Box<dyn Optimizer>,
        d_opt: Box<dyn Optimizer>,
    ) -> Self {
        let g_params = generator.parameters();
        let d_params = discriminator.parameters();
        Self {
            generator,
            discriminator,
            g_params,
            d_params,
            g_opt,
            d_opt,
            loss_fn: BCEWithLogitsLoss,
        }
    }

    /// One alternating update on a batch of real images.
    ///
    /// Returns (discriminator loss, generator loss).
    pub fn step(&mut self, real: &Batch, rng: &mut StdRng) -> (f32, f32) {
        let batch = real.size();
        let ones = Tensor::from_vec(vec![1.0; batch], false);
        let zeros = Tensor::from_vec(vec![0.0; batch], false);

        // Discriminator update: real up, fake down. The fake batch is
        // detached so generator gradients are not computed here.
        self.d_opt.zero_grad(&mut self.d_params);

        let d_real = self.discriminator.forward(&real.inputs, Mode::Train);
        let loss_real = self.loss_fn.forward(&d_real, &ones);

        let z = self.latent(batch, rng);
        let fake = self.generator.forward(&z, Mode::Train).detach();
        let d_fake = self.discriminator.forward(&fake, Mode::Train);
        let loss_fake = self.loss_fn.forward(&d_fake, &zeros);

        let d_loss = loss_real.data()[0] + loss_fake.data()[0];
        backward(&loss_real, None);
        backward(&loss_fake, None);
        self.d_opt.step(&mut self.d_params);

        // Generator update: push D(G(z)) toward the real label. The
        // backward pass also reaches discriminator parameters; those
        // gradients are cleared at the start of the next step.
        self.g_opt.zero_grad(&mut self.g_params);

        let z = self.latent(batch, rng);
        let fake = self.generator.forward(&z, Mode::Train);
        let d_out = self.discriminator.forward(&fake, Mode::Train);
        let g_loss_t = self.loss_fn.forward(&d_out, &ones);
        let g_loss = g_loss_t.data()[0];
        backward(&g_loss_t, None);
        self.g_opt.step(&mut self.g_params);

        (d_loss, g_loss)
    }

    /// One pass over the real batches; returns mean (D, G) losses.
    pub fn train_epoch(&mut self, batches: Vec<Batch>, rng: &mut StdRng) -> (f32, f32) {
        let mut d_total = 0.0;
        let mut g_total = 0.0;
        let mut n = 0;

        for batch in &batches {
            let (d, g) = self.step(batch, rng);
            d_total += d;
            g_total += g;
            n += 1;
        }

        if n > 0 {
            (d_total / n as f32, g_total / n as f32)
        } else {
            (0.0, 0.0)
        }
    }

    /// Sample a latent batch from the run RNG
    fn latent(&self, batch: usize, rng: &mut StdRng) -> Tensor {
        let dim = self.generator.latent_dim();
        let z: Vec<f32> = (0..batch * dim).map(|_| rng.random_range(-1.0..1.0)).collect();
        Tensor::from_vec(z, false)
    }

    /// The generator
    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// The discriminator
    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::SGD;
    use rand::SeedableRng;

    fn tiny_trainer() -> GanTrainer {
        let mut rng = StdRng::seed_from_u64(0);
        let generator = Generator::new(8, 1, 2, false, &mut rng);
        let discriminator = Discriminator::new(1, 2, false, &mut rng);
        GanTrainer::new(
            generator,
            discriminator,
            Box::new(SGD::new(0.01, 0.5)),
            Box::new(SGD::new(0.01, 0.5)),
        )
    }

    fn real_batch(n: usize, rng: &mut StdRng) -> Batch {
        let pixels: Vec<f32> = (0..n * 1024).map(|_| rng.random_range(-1.0..1.0)).collect();
        Batch::new(
            Tensor::from_vec(pixels, false),
            Tensor::from_vec(vec![0.0; n], false),
        )
    }

    #[test]
    fn test_gan_step_returns_finite_losses() {
        let mut trainer = tiny_trainer();
        let mut rng = StdRng::seed_from_u64(1);
        let real = real_batch(2, &mut rng);

        let (d_loss, g_loss) = trainer.step(&real, &mut rng);
        assert!(d_loss.is_finite() && d_loss > 0.0);
        assert!(g_loss.is_finite() && g_loss > 0.0);
    }

    #[test]
    fn test_gan_step_updates_both_networks() {
        let mut trainer = tiny_trainer();
        let mut rng = StdRng::seed_from_u64(1);
        let real = real_batch(2, &mut rng);

        let g_before = trainer.generator.parameters()[0].to_vec();
        let d_before = trainer.discriminator.parameters()[0].to_vec();

        trainer.step(&real, &mut rng);

        assert_ne!(trainer.generator.parameters()[0].to_vec(), g_before);
        assert_ne!(trainer.discriminator.parameters()[0].to_vec(), d_before);
    }

    #[test]
    fn test_gan_epoch_averages() {
        let mut trainer = tiny_trainer();
        let mut rng = StdRng::seed_from_u64(2);
        let batches = vec![real_batch(2, &mut rng), real_batch(2, &mut rng)];

        let (d, g) = trainer.train_epoch(batches, &mut rng);
        assert!(d.is_finite());
        assert!(g.is_finite());
    }
}
