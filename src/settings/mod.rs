use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Chebyshev Type I bandpass used to colour the injected noise floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandpassSettings {
    pub low_hz: f64,
    pub high_hz: f64,
    pub order: usize,
    pub ripple_db: f64,
}

impl Default for BandpassSettings {
    fn default() -> Self {
        Self {
            low_hz: 1000.0,
            high_hz: 7000.0,
            order: 15,
            ripple_db: 4.0,
        }
    }
}

impl std::fmt::Display for BandpassSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Low Cutoff: {} Hz", self.low_hz)?;
        writeln!(f, "High Cutoff: {} Hz", self.high_hz)?;
        writeln!(f, "Order: {}", self.order)?;
        writeln!(f, "Passband Ripple: {} dB", self.ripple_db)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseSettings {
    pub mean: f64,
    pub std_dev: f64,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.005,
        }
    }
}

impl std::fmt::Display for NoiseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Noise Mean: {}", self.mean)?;
        writeln!(f, "Noise Std Dev: {}", self.std_dev)?;
        Ok(())
    }
}

/// DSP constants of the chain. Everything here has a sensible default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub sample_rate: u32,
    pub bandpass: BandpassSettings,
    pub noise: NoiseSettings,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            bandpass: BandpassSettings::default(),
            noise: NoiseSettings::default(),
        }
    }
}

impl std::fmt::Display for ChainSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sample Rate: {}", self.sample_rate)?;
        write!(f, "{}", self.bandpass)?;
        write!(f, "{}", self.noise)?;
        Ok(())
    }
}

/// Locations of the three impulse responses. These are environment specific,
/// so there are no defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrPaths {
    pub speaker: PathBuf,
    pub room: PathBuf,
    pub microphone: PathBuf,
}

impl std::fmt::Display for IrPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Speaker IR: {}", self.speaker.display())?;
        writeln!(f, "Room IR: {}", self.room.display())?;
        writeln!(f, "Microphone IR: {}", self.microphone.display())?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub chain: ChainSettings,
    pub impulse_responses: IrPaths,
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "------------------------------")?;

        writeln!(f, "Chain Settings:")?;
        writeln!(f, "{}", self.chain)?;

        writeln!(f, "Impulse Responses:")?;
        write!(f, "{}", self.impulse_responses)?;
        Ok(())
    }
}

impl Settings {
    pub fn new(impulse_responses: IrPaths) -> Self {
        Self {
            chain: ChainSettings::default(),
            impulse_responses,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings =
            serde_json::from_str(&contents).context("Failed to parse settings")?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, json).context("Failed to write settings file")?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}
