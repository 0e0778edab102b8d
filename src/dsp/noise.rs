use log::debug;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::dsp::chebyshev::FilterCoefficients;
use crate::dsp::iir::filtfilt;
use crate::error::{PostError, Result};
use crate::settings::NoiseSettings;

/// Band-limited Gaussian noise floor.
///
/// The generator is always supplied by the caller, so a seeded `StdRng`
/// makes the injected noise reproducible.
#[derive(Debug, Clone)]
pub struct NoiseInjector {
    distribution: Normal<f64>,
    filter: FilterCoefficients,
}

impl NoiseInjector {
    pub fn new(settings: &NoiseSettings, filter: FilterCoefficients) -> Result<Self> {
        // Normal::new only rejects a non-finite std
        if !settings.mean.is_finite() || !settings.std_dev.is_finite() || settings.std_dev < 0.0 {
            return Err(PostError::InvalidConfig(format!(
                "noise needs a finite mean and a finite, non-negative std (got mean {}, std {})",
                settings.mean, settings.std_dev
            )));
        }

        let distribution = Normal::new(settings.mean, settings.std_dev).map_err(|e| {
            PostError::InvalidConfig(format!(
                "noise (mean {}, std {}): {e}",
                settings.mean, settings.std_dev
            ))
        })?;

        Ok(Self {
            distribution,
            filter,
        })
    }

    pub const fn filter(&self) -> &FilterCoefficients {
        &self.filter
    }

    /// Unfiltered Gaussian samples.
    pub fn white<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<f64> {
        (0..len).map(|_| self.distribution.sample(&mut *rng)).collect()
    }

    /// Gaussian samples passed zero-phase through the bandpass.
    pub fn shaped<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<f64> {
        let white = self.white(len, rng);
        filtfilt(&self.filter, &white)
    }

    /// Adds a fresh block of shaped noise to `signal`.
    pub fn inject<R: Rng + ?Sized>(&self, signal: &mut [f32], rng: &mut R) -> Result<()> {
        let noise = self.shaped(signal.len(), rng);
        debug!("Injecting {} samples of shaped noise", noise.len());
        mix_into(signal, &noise)
    }
}

/// Element-wise `signal += noise`.
pub fn mix_into(signal: &mut [f32], noise: &[f64]) -> Result<()> {
    if signal.len() != noise.len() {
        return Err(PostError::ShapeMismatch {
            expected: signal.len(),
            actual: noise.len(),
        });
    }

    for (s, &n) in signal.iter_mut().zip(noise) {
        *s = (*s as f64 + n) as f32;
    }
    Ok(())
}
