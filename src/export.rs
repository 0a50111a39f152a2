// Copyright (c) 2024 Mike Tsao

//! Writes rendered audio to files.

use crate::types::{SampleBuffer, SampleRate};
use std::path::Path;
use thiserror::Error;

/// Peaks above this are likely to clip on playback.
pub const CLIP_WARNING_LEVEL: f64 = 0.95;

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("buffer has no channels; the speaker layout is probably empty")]
    NoChannels,
    #[error("{0} channels is more than a WAV file can hold")]
    TooManyChannels(usize),
    #[error(transparent)]
    Wav(#[from] hound::Error),
}

/// Facts about a completed export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    #[allow(missing_docs)]
    pub frame_count: usize,
    #[allow(missing_docs)]
    pub channel_count: usize,
    /// The largest absolute sample value written.
    pub peak: f64,
}

/// Exports [SampleBuffer]s to various formats.
pub struct BufferExporter {}
impl BufferExporter {
    /// Writes the buffer as a 32-bit float WAV file with one WAV channel per
    /// buffer channel.
    pub fn export_to_wav(
        buffer: &SampleBuffer,
        sample_rate: SampleRate,
        path: &Path,
    ) -> Result<ExportReport, ExportError> {
        let channels = match buffer.channel_count() {
            0 => return Err(ExportError::NoChannels),
            n => u16::try_from(n).map_err(|_| ExportError::TooManyChannels(n))?,
        };
        let spec = hound::WavSpec {
            channels,
            sample_rate: sample_rate.into(),
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for sample in buffer.to_f32_interleaved() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        let report = ExportReport {
            frame_count: buffer.frame_count(),
            channel_count: buffer.channel_count(),
            peak: buffer.overall_peak(),
        };
        if report.peak > CLIP_WARNING_LEVEL {
            log::warn!(
                "{}: peak amplitude {:.3} may clip",
                path.display(),
                report.peak
            );
        }
        log::info!(
            "wrote {} frames x {} channels to {} (peak {:.3})",
            report.frame_count,
            report.channel_count,
            path.display(),
            report.peak
        );
        Ok(report)
    }
}
