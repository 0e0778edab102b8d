use log::debug;
use realfft::RealFftPlanner;

use super::same_offset;
use crate::error::Result;

/// Single-block FFT convolution.
///
/// Both operands are zero-padded to the next power of two that holds the
/// full linear convolution, so there is no circular wrap-around.
pub fn convolve_same(input: &[f32], ir: &[f32]) -> Result<Vec<f32>> {
    let full_len = input.len() + ir.len() - 1;
    let fft_len = full_len.next_power_of_two();

    let mut planner = RealFftPlanner::<f32>::new();
    let r2c = planner.plan_fft_forward(fft_len);
    let c2r = planner.plan_fft_inverse(fft_len);

    debug!(
        "FFT convolution: {} x {} samples, block {}",
        input.len(),
        ir.len(),
        fft_len
    );

    let mut time_block = r2c.make_input_vec();
    time_block[..input.len()].copy_from_slice(input);
    let mut signal_spectrum = r2c.make_output_vec();
    r2c.process(&mut time_block, &mut signal_spectrum)?;

    let mut time_block = r2c.make_input_vec();
    time_block[..ir.len()].copy_from_slice(ir);
    let mut ir_spectrum = r2c.make_output_vec();
    r2c.process(&mut time_block, &mut ir_spectrum)?;

    for (s, h) in signal_spectrum.iter_mut().zip(&ir_spectrum) {
        *s *= *h;
    }

    // Ensure DC and Nyquist are real
    signal_spectrum[0].im = 0.0;
    if let Some(last) = signal_spectrum.last_mut() {
        last.im = 0.0;
    }

    let mut output = c2r.make_output_vec();
    c2r.process(&mut signal_spectrum, &mut output)?;

    let scale = 1.0 / fft_len as f32;
    let offset = same_offset(ir.len());

    Ok(output[offset..offset + input.len()]
        .iter()
        .map(|&s| s * scale)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_matches_small_reference() -> anyhow::Result<()> {
        let output = convolve_same(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5])?;
        for (y, e) in output.iter().zip([1.0, 2.5, 4.0]) {
            assert!((*y - e).abs() < 1e-5, "{y} vs {e}");
        }
        Ok(())
    }

    #[test]
    fn test_fft_even_ir_window() -> anyhow::Result<()> {
        // full: [1, 2, 3, 4, 5, 0, 0, 0] -> offset 1
        let output = convolve_same(&[1.0, 2.0, 3.0, 4.0, 5.0], &[1.0, 0.0, 0.0, 0.0])?;
        for (y, e) in output.iter().zip([2.0, 3.0, 4.0, 5.0, 0.0]) {
            assert!((*y - e).abs() < 1e-5, "{y} vs {e}");
        }
        Ok(())
    }
}
