use log::debug;
use rand::Rng;

use crate::dsp::chebyshev::{FilterCoefficients, design_bandpass};
use crate::dsp::noise::NoiseInjector;
use crate::error::Result;
use crate::ir::convolver::convolve_same;
use crate::ir::model::IrSet;
use crate::settings::ChainSettings;

/// Speaker -> noise floor -> room -> microphone.
///
/// Everything here is immutable after construction, so one processor can
/// be shared across threads as long as each call brings its own generator.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    /// Speaker, room and microphone impulse responses.
    irs: IrSet,
    /// Gaussian noise shaped by the Chebyshev bandpass.
    noise: NoiseInjector,
}

impl PostProcessor {
    /// Designs the noise bandpass once and takes ownership of the IRs.
    pub fn new(irs: IrSet, settings: &ChainSettings) -> Result<Self> {
        let filter = design_bandpass(&settings.bandpass, settings.sample_rate)?;
        let noise = NoiseInjector::new(&settings.noise, filter)?;

        debug!(
            "Post processor ready: speaker {} / room {} / mic {} samples",
            irs.speaker.len(),
            irs.room.len(),
            irs.microphone.len()
        );

        Ok(Self { irs, noise })
    }

    pub const fn irs(&self) -> &IrSet {
        &self.irs
    }

    pub const fn filter(&self) -> &FilterCoefficients {
        self.noise.filter()
    }

    /// Runs the whole chain. The output has the same length as `input`.
    pub fn process<R: Rng + ?Sized>(&self, input: &[f32], rng: &mut R) -> Result<Vec<f32>> {
        let mut speaker_out = convolve_same(input, &self.irs.speaker)?;

        self.noise.inject(&mut speaker_out, rng)?;

        let room_out = convolve_same(&speaker_out, &self.irs.room)?;
        let audio_out = convolve_same(&room_out, &self.irs.microphone)?;

        debug!("Processed {} samples", audio_out.len());
        Ok(audio_out)
    }
}
