use hound::WavReader;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::{PostError, Result};

pub struct IrLoader {
    target_sample_rate: u32,
}

impl IrLoader {
    pub const fn new(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    pub const fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Decodes a WAV file to mono samples at the target sample rate.
    pub fn load(&self, path: &Path) -> Result<Vec<f32>> {
        if !path.is_file() {
            return Err(PostError::ResourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let decode_err = |message: String| PostError::Decode {
            path: path.to_path_buf(),
            message,
        };

        let reader = WavReader::open(path).map_err(|e| decode_err(e.to_string()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = if spec.sample_format == hound::SampleFormat::Float {
            reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| decode_err(format!("failed to read float samples: {e}")))?
        } else {
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| decode_err(format!("failed to read integer samples: {e}")))?
        };

        if samples.is_empty() {
            return Err(decode_err("file contains no samples".to_string()));
        }

        let mono = if spec.channels > 1 {
            debug!("Downmixing {} channels to mono", spec.channels);
            samples
                .chunks(spec.channels as usize)
                .map(|c| c.iter().sum::<f32>() / spec.channels as f32)
                .collect()
        } else {
            samples
        };

        if spec.sample_rate != self.target_sample_rate {
            debug!(
                "Resampling {:?} from {} Hz to {} Hz",
                path, spec.sample_rate, self.target_sample_rate
            );
            resample(&mono, spec.sample_rate, self.target_sample_rate)
        } else {
            Ok(mono)
        }
    }
}

/// Catalog of the `.wav` files found below a directory, keyed by their
/// `/`-separated path relative to it.
pub struct IrLibrary {
    loader: IrLoader,
    available_ir_paths: Vec<(String, PathBuf)>,
    ir_directory: PathBuf,
}

impl IrLibrary {
    pub fn new(directory: &Path, target_sample_rate: u32) -> Result<Self> {
        let mut library = Self {
            loader: IrLoader::new(target_sample_rate),
            available_ir_paths: Vec::new(),
            ir_directory: directory.to_path_buf(),
        };

        library.scan_ir_directory()?;

        Ok(library)
    }

    pub fn load_by_name(&self, name: &str) -> Result<Vec<f32>> {
        self.available_ir_paths
            .iter()
            .find(|(ir_name, _)| ir_name == name)
            .map_or_else(
                || {
                    Err(PostError::ResourceNotFound {
                        path: self.ir_directory.join(name),
                    })
                },
                |(_, ir_path)| self.loader.load(ir_path),
            )
    }

    // available ir names returns a string list of impulse response names
    pub fn available_ir_names(&self) -> Vec<String> {
        self.available_ir_paths
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn scan_ir_directory(&mut self) -> Result<()> {
        if !self.ir_directory.is_dir() {
            return Err(PostError::ResourceNotFound {
                path: self.ir_directory.clone(),
            });
        }

        self.available_ir_paths.clear();
        let base = self.ir_directory.clone();
        self.scan_recursive(&base, &base)?;

        self.available_ir_paths.sort_by(|a, b| {
            let a_sep_count = a.0.matches('/').count();
            let b_sep_count = b.0.matches('/').count();
            a_sep_count.cmp(&b_sep_count).then_with(|| a.0.cmp(&b.0))
        });

        if self.available_ir_paths.is_empty() {
            warn!("No impulse responses found in {:?}", self.ir_directory);
        } else {
            debug!(
                "Found {} impulse response files",
                self.available_ir_paths.len()
            );
        }
        Ok(())
    }

    fn scan_recursive(&mut self, current_dir: &Path, base_dir: &Path) -> Result<()> {
        for entry in fs::read_dir(current_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                self.scan_recursive(&path, base_dir)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("wav") {
                let relative_path = path
                    .strip_prefix(base_dir)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");

                self.available_ir_paths.push((relative_path, path));
            }
        }
        Ok(())
    }
}

/// Resamples `samples` from `from_rate` to `to_rate`.
///
/// The result is time-aligned with the input (output `k` sits at input time
/// `k * from_rate / to_rate`) and holds `ceil(len * to_rate / from_rate)`
/// samples, so neither the onset nor the tail of an IR is lost.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(PostError::Resample(format!(
            "cannot resample from {from_rate} Hz to {to_rate} Hz"
        )));
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let expected_len = (samples.len() as f64 * ratio).ceil() as usize;

    // Raw output k lands at input time (k + 1) * from / to - 1. Leading zeros
    // and skipped frames move that onto an exact k * from / to grid.
    let common = gcd(from_rate, to_rate);
    let lead = (from_rate / common - 1) as usize;
    let skip = (to_rate / common - 1) as usize;

    let mut padded = vec![0.0; lead];
    padded.extend_from_slice(samples);

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, padded.len(), 1)
        .map_err(|e| PostError::Resample(e.to_string()))?;

    let input = vec![padded];
    let mut output = first_channel(
        resampler
            .process(&input, None)
            .map_err(|e| PostError::Resample(e.to_string()))?,
    )?;

    // Flush zeros through until the filter tail is out
    while output.len() < skip + expected_len {
        let tail = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| PostError::Resample(e.to_string()))?;
        output.extend(first_channel(tail)?);
    }

    output.drain(..skip);
    output.truncate(expected_len);
    Ok(output)
}

const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

fn first_channel(channels: Vec<Vec<f32>>) -> Result<Vec<f32>> {
    channels
        .into_iter()
        .next()
        .ok_or_else(|| PostError::Resample("resampler produced no channels".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use tempfile::TempDir;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[i16]) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let loader = IrLoader::new(16000);

        let err = loader.load(&tmp.path().join("missing.wav")).unwrap_err();
        assert!(matches!(err, PostError::ResourceNotFound { .. }));
    }

    #[test]
    fn test_load_garbage_is_decode_error() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("broken.wav");
        std::fs::write(&path, "definitely not a riff header")?;

        let err = IrLoader::new(16000).load(&path).unwrap_err();
        assert!(matches!(err, PostError::Decode { .. }));
        Ok(())
    }

    #[test]
    fn test_load_empty_wav_is_decode_error() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("empty.wav");
        write_wav(&path, 1, 16000, &[]);

        let err = IrLoader::new(16000).load(&path).unwrap_err();
        assert!(matches!(err, PostError::Decode { .. }));
        Ok(())
    }

    #[test]
    fn test_load_scales_integer_samples() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("ir.wav");
        write_wav(&path, 1, 16000, &[16384, -16384, 0]);

        let ir = IrLoader::new(16000).load(&path)?;
        assert_eq!(ir, vec![0.5, -0.5, 0.0]);
        Ok(())
    }

    #[test]
    fn test_load_downmixes_stereo() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("stereo.wav");
        // Two frames: (0.5, 0.0) and (-0.5, -0.5)
        write_wav(&path, 2, 16000, &[16384, 0, -16384, -16384]);

        let ir = IrLoader::new(16000).load(&path)?;
        assert_eq!(ir, vec![0.25, -0.5]);
        Ok(())
    }

    #[test]
    fn test_load_resamples_to_target_rate() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("48k.wav");
        let frames: Vec<i16> = (0..4800)
            .map(|i| ((i as f32 * 0.01).sin() * 8000.0) as i16)
            .collect();
        write_wav(&path, 1, 48000, &frames);

        let loader = IrLoader::new(16000);
        assert_eq!(loader.target_sample_rate(), 16000);

        let ir = loader.load(&path)?;
        assert_eq!(ir.len(), 1600);
        Ok(())
    }

    #[test]
    fn test_resample_keeps_onset_and_tail() -> anyhow::Result<()> {
        let area = |impulse_at: usize| -> anyhow::Result<f32> {
            let mut input = vec![0.0f32; 4800];
            input[impulse_at] = 1.0;
            let output = resample(&input, 48000, 16000)?;
            assert_eq!(output.len(), 1600);
            Ok(output.iter().sum())
        };

        // A unit impulse keeps about a third of its area at a third of the rate
        let middle = area(2400)?;

        let mut centred = vec![0.0f32; 4800];
        centred[2400] = 1.0;
        let output = resample(&centred, 48000, 16000)?;
        let peak = (0..output.len())
            .max_by(|&a, &b| output[a].abs().total_cmp(&output[b].abs()))
            .unwrap();
        assert_eq!(peak, 800);
        assert!((middle - 1.0 / 3.0).abs() < 0.02, "middle = {middle}");

        let head = area(0)?;
        let tail = area(4790)?;
        assert!(head > 0.25 && head < 0.42, "head = {head}");
        assert!(tail > 0.25 && tail < 0.42, "tail = {tail}");
        Ok(())
    }

    #[test]
    fn test_resample_short_ir() -> anyhow::Result<()> {
        let output = resample(&[1.0, 0.5, 0.25], 48000, 16000)?;
        assert_eq!(output.len(), 1);

        let output = resample(&[1.0, 0.5, 0.25], 16000, 48000)?;
        assert_eq!(output.len(), 9);
        assert!(output.iter().all(|s| s.is_finite()));
        Ok(())
    }

    #[test]
    fn test_scan_ir_directory_finds_wavs() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let ir_dir = tmp.path().join("irs");
        std::fs::create_dir_all(ir_dir.join("room"))?;

        std::fs::write(ir_dir.join("b.wav"), "")?;
        std::fs::write(ir_dir.join("a.wav"), "")?;
        std::fs::write(ir_dir.join("notes.txt"), "")?;
        std::fs::write(ir_dir.join("room").join("brir.wav"), "")?;

        let library = IrLibrary::new(&ir_dir, 16000)?;
        assert_eq!(
            library.available_ir_names(),
            vec!["a.wav", "b.wav", "room/brir.wav"]
        );

        Ok(())
    }

    #[test]
    fn test_load_by_name() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        write_wav(&tmp.path().join("mic.wav"), 1, 16000, &[16384]);

        let library = IrLibrary::new(tmp.path(), 16000)?;
        assert_eq!(library.load_by_name("mic.wav")?, vec![0.5]);
        assert!(matches!(
            library.load_by_name("other.wav"),
            Err(PostError::ResourceNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = IrLibrary::new(&tmp.path().join("nope"), 16000);
        assert!(matches!(result, Err(PostError::ResourceNotFound { .. })));
    }

    #[test]
    fn test_resample_halves_length() -> anyhow::Result<()> {
        let input: Vec<f32> = (0..48000).map(|x| (x as f32).sin()).collect();
        let output = resample(&input, 48000, 24000)?;

        assert_eq!(output.len(), 24000);
        Ok(())
    }

    #[test]
    fn test_resample_zero_rate_rejected() {
        assert!(matches!(
            resample(&[1.0, 0.5], 0, 16000),
            Err(PostError::Resample(_))
        ));
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(48000, 16000), 16000);
        assert_eq!(gcd(44100, 16000), 100);
        assert_eq!(gcd(7, 5), 1);
    }

    #[test]
    fn test_resample_same_rate_unchanged() -> anyhow::Result<()> {
        let input: Vec<f32> = (0..1000).map(|x| (x as f32).sin()).collect();
        let output = resample(&input, 48000, 48000)?;

        assert_eq!(output, input);
        Ok(())
    }
}
