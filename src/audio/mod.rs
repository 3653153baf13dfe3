//! In-memory audio and the decode/encode capability around it.
//!
//! Samples are kept interleaved as `f32` in `[-1.0, 1.0]`, whatever the source
//! container stored. Concatenation follows the usual "sync then append" rule:
//! both sides are brought to the larger sample rate and channel count first.

pub mod decode;
pub mod encode;

use std::path::Path;
use std::time::Duration;

use crate::error::MergeError;

pub use decode::{decode_bytes, decode_file};
pub use encode::export;

#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: usize) -> Self {
        debug_assert!(channels > 0, "a segment needs at least one channel");
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Appends `other` to the end of `self`.
    ///
    /// If the two differ in rate or layout, both are converted to the larger of each
    /// before the samples are joined.
    pub fn append(&mut self, other: AudioSegment) -> Result<(), MergeError> {
        let rate = self.sample_rate.max(other.sample_rate);
        let channels = self.channels.max(other.channels);

        let mut other = other;
        other.convert(rate, channels)?;
        self.convert(rate, channels)?;

        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    fn convert(&mut self, rate: u32, channels: usize) -> Result<(), MergeError> {
        if self.channels != channels {
            self.set_channels(channels)?;
        }
        if self.sample_rate != rate {
            self.resample(rate);
        }
        Ok(())
    }

    fn set_channels(&mut self, channels: usize) -> Result<(), MergeError> {
        if self.channels != 1 {
            return Err(MergeError::ChannelLayout {
                from: self.channels,
                to: channels,
            });
        }
        self.samples = self
            .samples
            .iter()
            .flat_map(|&s| std::iter::repeat(s).take(channels))
            .collect();
        self.channels = channels;
        Ok(())
    }

    /// Linear-interpolation rate conversion.
    fn resample(&mut self, rate: u32) {
        let frames = self.frames();
        if frames == 0 || self.sample_rate == 0 {
            self.sample_rate = rate;
            return;
        }

        let ratio = self.sample_rate as f64 / rate as f64;
        let out_frames = ((frames as f64) / ratio).round() as usize;
        let ch = self.channels;
        let mut out = Vec::with_capacity(out_frames * ch);

        for i in 0..out_frames {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(frames - 1);
            let next = (idx + 1).min(frames - 1);
            let frac = (pos - idx as f64) as f32;
            for c in 0..ch {
                let a = self.samples[idx * ch + c];
                let b = self.samples[next * ch + c];
                out.push(a + (b - a) * frac);
            }
        }

        self.samples = out;
        self.sample_rate = rate;
    }
}

/// Lower-cased text after the last `.` of the file name, used to pick a codec
/// for decode and export. A bare `.mp3` counts as `mp3`.
pub fn format_hint(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
}
