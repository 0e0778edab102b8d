use anyhow::{Context, Result};
use cabsim::ir::{IrLibrary, IrLoader, IrSet};
use cabsim::processor::PostProcessor;
use cabsim::settings::Settings;
use clap::{Parser, Subcommand};
use hound::{WavSpec, WavWriter};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "cabsim")]
#[command(version)]
#[command(about = "Speaker, room and microphone simulation with a shaped noise floor.")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a WAV file through the speaker / room / mic chain
    Process {
        #[arg(
            long,
            env = "CABSIM_CONFIG",
            help = "JSON settings file with the impulse response paths"
        )]
        config: PathBuf,
        #[arg(long, help = "Input WAV file")]
        input: PathBuf,
        #[arg(long, help = "Output WAV file (32-bit float, mono)")]
        output: PathBuf,
        #[arg(long, help = "Seed for the noise generator")]
        seed: Option<u64>,
    },
    /// List the impulse responses found in a directory
    ListIrs {
        #[arg(long, env = "IR_DIR", default_value = "./impulse_responses")]
        dir: PathBuf,
        #[arg(long, default_value_t = 16000)]
        sample_rate: u32,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    info!("cabsim v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Process {
            config,
            input,
            output,
            seed,
        } => process(&config, &input, &output, seed),
        Command::ListIrs { dir, sample_rate } => list_irs(&dir, sample_rate),
    }
}

fn process(config: &Path, input: &Path, output: &Path, seed: Option<u64>) -> Result<()> {
    let settings = Settings::load(config)?;
    info!("Settings:\n{settings}");

    let loader = IrLoader::new(settings.chain.sample_rate);

    let irs = IrSet::load(&settings.impulse_responses, &loader)
        .context("failed to load impulse responses")?;
    let processor =
        PostProcessor::new(irs, &settings.chain).context("failed to build post processor")?;

    let samples = loader
        .load(input)
        .with_context(|| format!("failed to read input '{}'", input.display()))?;
    info!("Read {} samples from {:?}", samples.len(), input);

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let processed = processor
        .process(&samples, &mut rng)
        .context("post processing failed")?;

    write_wav(output, &processed, loader.target_sample_rate())
        .with_context(|| format!("failed to write output '{}'", output.display()))?;
    info!("Wrote {} samples to {:?}", processed.len(), output);

    Ok(())
}

fn list_irs(dir: &Path, sample_rate: u32) -> Result<()> {
    let library = IrLibrary::new(dir, sample_rate)
        .with_context(|| format!("failed to scan '{}'", dir.display()))?;

    for name in library.available_ir_names() {
        println!("{name}");
    }

    Ok(())
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(())
}
