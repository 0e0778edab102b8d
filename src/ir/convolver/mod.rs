pub mod fft;
pub mod fir;

use crate::error::{PostError, Result};

/// IRs up to this many taps are convolved directly in the time domain.
pub const FIR_MAX_TAPS: usize = 64;

/// Convolution back end selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolutionMethod {
    Fir,
    Fft,
}

impl ConvolutionMethod {
    pub const fn for_ir_length(ir_len: usize) -> Self {
        if ir_len <= FIR_MAX_TAPS {
            Self::Fir
        } else {
            Self::Fft
        }
    }
}

/// Convolves `input` with `ir` and keeps the centred window of the full
/// result that is as long as `input`.
///
/// The window starts at `(ir.len() - 1) / 2` in the full convolution, so a
/// centred delta IR returns the input unchanged.
pub fn convolve_same(input: &[f32], ir: &[f32]) -> Result<Vec<f32>> {
    convolve_same_with(ConvolutionMethod::for_ir_length(ir.len()), input, ir)
}

pub fn convolve_same_with(
    method: ConvolutionMethod,
    input: &[f32],
    ir: &[f32],
) -> Result<Vec<f32>> {
    if input.is_empty() {
        return Err(PostError::EmptyInput("cannot convolve an empty signal"));
    }
    if ir.is_empty() {
        return Err(PostError::EmptyInput(
            "cannot convolve with an empty impulse response",
        ));
    }

    match method {
        ConvolutionMethod::Fir => Ok(fir::convolve_same(input, ir)),
        ConvolutionMethod::Fft => fft::convolve_same(input, ir),
    }
}

#[inline]
pub(crate) const fn same_offset(ir_len: usize) -> usize {
    ir_len.saturating_sub(1) / 2
}
