//! Chebyshev Type I bandpass design.
//!
//! The analog lowpass prototype is transformed to a bandpass and then mapped
//! to the z-plane with the bilinear transform (`fs = 2`, so frequencies are
//! normalised to Nyquist). Band edges are pre-warped, so the digital filter
//! hits exactly `-ripple_db` at both corners.

use log::debug;
use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::{PostError, Result};
use crate::settings::BandpassSettings;

/// Transfer function coefficients in descending powers of `z`, with
/// `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl FilterCoefficients {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        if b.is_empty() || a.is_empty() {
            return Err(PostError::EmptyInput("filter needs b and a coefficients"));
        }

        let a0 = a[0];
        if a0 == 0.0 || !a0.is_finite() {
            return Err(PostError::InvalidFilterSpec(format!(
                "leading denominator coefficient must be non-zero, got {a0}"
            )));
        }

        Ok(Self {
            b: b.iter().map(|v| v / a0).collect(),
            a: a.iter().map(|v| v / a0).collect(),
        })
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Number of state variables a direct-form realisation needs.
    pub fn order(&self) -> usize {
        self.b.len().max(self.a.len()) - 1
    }

    /// Complex response at `normalized_freq` (1.0 is Nyquist).
    pub fn response(&self, normalized_freq: f64) -> Complex64 {
        let w = PI * normalized_freq;
        let eval = |coeffs: &[f64]| -> Complex64 {
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &c)| Complex64::from_polar(c, -w * k as f64))
                .sum()
        };
        eval(self.b()) / eval(self.a())
    }

    /// Magnitude response at a frequency in Hz.
    pub fn gain_at(&self, freq_hz: f64, sample_rate: f64) -> f64 {
        self.response(freq_hz / (0.5 * sample_rate)).norm()
    }
}

/// Band edges as fractions of the Nyquist frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBand {
    pub low: f64,
    pub high: f64,
}

impl NormalizedBand {
    pub fn from_hz(low_hz: f64, high_hz: f64, sample_rate: f64) -> Result<Self> {
        let nyquist = 0.5 * sample_rate;
        let band = Self {
            low: low_hz / nyquist,
            high: high_hz / nyquist,
        };
        band.validate()?;
        Ok(band)
    }

    fn validate(&self) -> Result<()> {
        let inside = |v: f64| v.is_finite() && v > 0.0 && v < 1.0;
        if !inside(self.low) || !inside(self.high) {
            return Err(PostError::InvalidFilterSpec(format!(
                "normalised cutoffs must lie strictly between 0 and 1, got ({}, {})",
                self.low, self.high
            )));
        }
        if self.low >= self.high {
            return Err(PostError::InvalidFilterSpec(format!(
                "low cutoff {} must be below high cutoff {}",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Designs the bandpass described by `settings` for the given sample rate.
pub fn design_bandpass(
    settings: &BandpassSettings,
    sample_rate: u32,
) -> Result<FilterCoefficients> {
    let band = NormalizedBand::from_hz(settings.low_hz, settings.high_hz, sample_rate as f64)?;
    debug!(
        "Designing order {} Chebyshev I bandpass, {} dB ripple, band ({:.4}, {:.4})",
        settings.order, settings.ripple_db, band.low, band.high
    );
    chebyshev1_bandpass(settings.order, settings.ripple_db, band)
}

pub fn chebyshev1_bandpass(
    order: usize,
    ripple_db: f64,
    band: NormalizedBand,
) -> Result<FilterCoefficients> {
    if order == 0 {
        return Err(PostError::InvalidFilterSpec(
            "filter order must be at least 1".to_string(),
        ));
    }
    if !(ripple_db.is_finite() && ripple_db > 0.0) {
        return Err(PostError::InvalidFilterSpec(format!(
            "passband ripple must be positive, got {ripple_db} dB"
        )));
    }
    band.validate()?;

    let (poles, gain) = analog_prototype(order, ripple_db);

    // Pre-warp the band edges for the bilinear transform at fs = 2
    let fs2: f64 = 4.0;
    let w1 = fs2 * (PI * band.low / 2.0).tan();
    let w2 = fs2 * (PI * band.high / 2.0).tan();
    let bw = w2 - w1;
    let wo = (w1 * w2).sqrt();

    // Lowpass -> bandpass: every prototype pole splits in two and `order`
    // zeros appear at the origin.
    let mut bp_poles = Vec::with_capacity(2 * order);
    for &p in &poles {
        let scaled = p * (bw / 2.0);
        let disc = (scaled * scaled - wo * wo).sqrt();
        bp_poles.push(scaled + disc);
    }
    for &p in &poles {
        let scaled = p * (bw / 2.0);
        let disc = (scaled * scaled - wo * wo).sqrt();
        bp_poles.push(scaled - disc);
    }
    let bp_gain = gain * bw.powi(order as i32);

    // Bilinear transform. Zeros at the origin land on z = 1, and the excess
    // poles bring the same number of zeros at z = -1.
    let z_poles: Vec<Complex64> = bp_poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();
    let mut z_zeros = vec![Complex64::new(1.0, 0.0); order];
    z_zeros.extend(std::iter::repeat_n(Complex64::new(-1.0, 0.0), order));

    let denom: Complex64 = bp_poles.iter().map(|&p| fs2 - p).product();
    let z_gain = bp_gain * (Complex64::new(fs2.powi(order as i32), 0.0) / denom).re;

    let b = poly(&z_zeros).into_iter().map(|c| c.re * z_gain).collect();
    let a = poly(&z_poles).into_iter().map(|c| c.re).collect();

    FilterCoefficients::new(b, a)
}

/// Poles and gain of the normalised analog Chebyshev Type I lowpass.
fn analog_prototype(order: usize, ripple_db: f64) -> (Vec<Complex64>, f64) {
    let n = order as f64;
    let eps = (10f64.powf(0.1 * ripple_db) - 1.0).sqrt();
    let mu = (1.0 / eps).asinh() / n;

    let poles: Vec<Complex64> = (0..order)
        .map(|i| {
            let m = 2.0 * i as f64 - (n - 1.0);
            let theta = PI * m / (2.0 * n);
            -Complex64::new(mu, theta).sinh()
        })
        .collect();

    let mut gain = poles.iter().map(|&p| -p).product::<Complex64>().re;
    if order % 2 == 0 {
        gain /= (1.0 + eps * eps).sqrt();
    }

    (poles, gain)
}

/// Expands roots into polynomial coefficients, highest power first.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &r in roots {
        coeffs.push(Complex64::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= r * prev;
        }
    }
    coeffs
}
