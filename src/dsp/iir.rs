use crate::dsp::chebyshev::FilterCoefficients;

/// Direct form II transposed IIR filter.
pub struct IirFilter {
    b: Vec<f64>,
    a: Vec<f64>,
    state: Vec<f64>,
}

impl IirFilter {
    pub fn new(coeffs: &FilterCoefficients) -> Self {
        let len = coeffs.order() + 1;
        let mut b = coeffs.b().to_vec();
        let mut a = coeffs.a().to_vec();
        b.resize(len, 0.0);
        a.resize(len, 0.0);

        Self {
            b,
            a,
            state: vec![0.0; len - 1],
        }
    }

    /// State that makes a constant input of 1.0 produce its steady-state
    /// output from the first sample on.
    pub fn step_state(&self) -> Vec<f64> {
        let sum_a: f64 = self.a.iter().sum();
        let dc_gain = if sum_a.abs() > f64::EPSILON {
            self.b.iter().sum::<f64>() / sum_a
        } else {
            0.0
        };

        let mut zi = vec![0.0; self.state.len()];
        let mut acc = 0.0;
        for i in (0..zi.len()).rev() {
            acc += self.a[i + 1].mul_add(-dc_gain, self.b[i + 1]);
            zi[i] = acc;
        }
        zi
    }

    /// Loads the steady state for a constant input of `level`.
    pub fn prime(&mut self, level: f64) {
        let zi = self.step_state();
        for (s, z) in self.state.iter_mut().zip(zi) {
            *s = z * level;
        }
    }

    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }

    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let output = self.b[0].mul_add(input, self.state.first().copied().unwrap_or(0.0));

        let n = self.state.len();
        for i in 0..n {
            let next = if i + 1 < n { self.state[i + 1] } else { 0.0 };
            self.state[i] = self.b[i + 1].mul_add(input, next) - self.a[i + 1] * output;
        }

        output
    }

    pub fn process_block(&mut self, samples: &mut [f64]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Number of samples reflected onto each end before zero-phase filtering.
pub fn edge_padding(coeffs: &FilterCoefficients, signal_len: usize) -> usize {
    let taps = coeffs.b().len().max(coeffs.a().len());
    (3 * taps).min(signal_len.saturating_sub(1))
}

/// Forward-backward filtering. The result has no phase shift and the
/// squared magnitude response of `coeffs`.
///
/// Both ends are extended by odd reflection and each pass starts from the
/// steady state for its first sample, which keeps edge transients small.
pub fn filtfilt(coeffs: &FilterCoefficients, signal: &[f64]) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }

    let pad = edge_padding(coeffs, signal.len());
    let mut ext = odd_extend(signal, pad);

    let mut filter = IirFilter::new(coeffs);

    filter.prime(ext[0]);
    filter.process_block(&mut ext);

    ext.reverse();
    filter.prime(ext[0]);
    filter.process_block(&mut ext);
    ext.reverse();

    ext.drain(..pad);
    ext.truncate(signal.len());
    ext
}

fn odd_extend(signal: &[f64], pad: usize) -> Vec<f64> {
    let len = signal.len();
    let first = signal[0];
    let last = signal[len - 1];

    let mut ext = Vec::with_capacity(len + 2 * pad);
    ext.extend((1..=pad).rev().map(|k| 2.0f64.mul_add(first, -signal[k])));
    ext.extend_from_slice(signal);
    ext.extend((1..=pad).map(|k| 2.0f64.mul_add(last, -signal[len - 1 - k])));
    ext
}
