//! WAV file recorder
//!
//! Writes synthesized sounds to mono 32-bit float WAV files.

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::synth::SampleBuffer;

/// WAV file recorder
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    samples_written: u64,
}

impl Recorder {
    /// Create a new recorder
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            bail!("sample rate must be positive");
        }

        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            samples_written: 0,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of samples written
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Get the duration recorded in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / self.sample_rate as f64
    }

    /// Write a slice of samples
    pub fn write_samples(&mut self, samples: &[f32]) -> Result<()> {
        for &sample in samples {
            self.writer
                .write_sample(sample)
                .context("failed to write sample")?;
        }
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    /// Append a synthesized buffer; its rate must match the file's
    pub fn write_buffer(&mut self, buffer: &SampleBuffer) -> Result<()> {
        if buffer.sample_rate() != self.sample_rate {
            bail!(
                "buffer is {} Hz but the file is {} Hz",
                buffer.sample_rate(),
                self.sample_rate
            );
        }
        self.write_samples(buffer.samples())
    }

    /// Finalize the WAV file
    ///
    /// This must be called to properly close the file and write the header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}

/// Write one buffer to `path` as a complete WAV file
pub fn render_to_wav(path: &Path, buffer: &SampleBuffer) -> Result<()> {
    let mut recorder = Recorder::new(path, buffer.sample_rate())?;
    recorder.write_buffer(buffer)?;
    recorder.finalize()
}
