pub mod chebyshev;
pub mod iir;
pub mod noise;

pub use chebyshev::{FilterCoefficients, NormalizedBand, design_bandpass};
pub use iir::{IirFilter, filtfilt};
pub use noise::NoiseInjector;
