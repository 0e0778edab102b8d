use log::debug;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use crate::error::{PostError, Result};
use crate::ir::loader::IrLoader;
use crate::settings::IrPaths;

/// Immutable, non-empty mono impulse response. Cloning shares the samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    samples: Arc<[f32]>,
}

impl ImpulseResponse {
    pub fn new(samples: Vec<f32>) -> Result<Self> {
        if samples.is_empty() {
            return Err(PostError::EmptyInput("impulse response has no samples"));
        }

        Ok(Self {
            samples: samples.into(),
        })
    }

    /// A single `1.0` tap. Convolving with it leaves a signal untouched.
    pub fn unit() -> Self {
        Self {
            samples: Arc::from([1.0_f32]),
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl Deref for ImpulseResponse {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.samples
    }
}

/// The speaker, room and microphone responses the chain convolves with.
#[derive(Debug, Clone, PartialEq)]
pub struct IrSet {
    pub speaker: ImpulseResponse,
    pub room: ImpulseResponse,
    pub microphone: ImpulseResponse,
}

impl IrSet {
    pub const fn new(
        speaker: ImpulseResponse,
        room: ImpulseResponse,
        microphone: ImpulseResponse,
    ) -> Self {
        Self {
            speaker,
            room,
            microphone,
        }
    }

    /// Every stage a no-op.
    pub fn identity() -> Self {
        Self::new(
            ImpulseResponse::unit(),
            ImpulseResponse::unit(),
            ImpulseResponse::unit(),
        )
    }

    pub fn load(paths: &IrPaths, loader: &IrLoader) -> Result<Self> {
        let load = |name: &str, path: &Path| -> Result<ImpulseResponse> {
            let ir = ImpulseResponse::new(loader.load(path)?)?;
            debug!("Loaded {name} IR {:?}: {} samples", path, ir.len());
            Ok(ir)
        };

        Ok(Self::new(
            load("speaker", paths.speaker.as_path())?,
            load("room", paths.room.as_path())?,
            load("microphone", paths.microphone.as_path())?,
        ))
    }
}
