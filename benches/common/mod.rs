use cabsim::ir::{ImpulseResponse, IrSet};
use hound::{WavSpec, WavWriter};
use std::path::Path;

pub const SAMPLE_RATE: u32 = 16000;

pub fn decaying_sine(length: usize, sample_rate: u32) -> Vec<f32> {
    (0..length)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let decay = (-t * 3.0).exp();
            let freq = 440.0 * 2.0 * std::f32::consts::PI;
            (freq * t).sin() * decay
        })
        .collect()
}

#[allow(dead_code)]
pub fn synthetic_set(speaker_len: usize, room_len: usize, mic_len: usize) -> IrSet {
    let ir = |len| ImpulseResponse::new(decaying_sine(len, SAMPLE_RATE)).unwrap();
    IrSet::new(ir(speaker_len), ir(room_len), ir(mic_len))
}

#[allow(dead_code)]
pub fn write_synthetic_ir(path: &Path, length: usize, sample_rate: u32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).unwrap();

    for sample in decaying_sine(length, sample_rate) {
        let sample_i16 = (sample * i16::MAX as f32) as i16;
        writer.write_sample(sample_i16).unwrap();
    }

    writer.finalize().unwrap();
}
