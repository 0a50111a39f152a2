// Copyright (c) 2024 Mike Tsao

//! [SampleBuffer] holds multi-channel audio as interleaved frames.

use super::SampleType;

/// A block of multi-channel audio. Samples are interleaved: frame `f`,
/// channel `c` lives at index `f * channel_count + c`.
///
/// A buffer with zero channels can still report a frame count of zero, which
/// is what an empty speaker layout produces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleBuffer {
    channel_count: usize,
    samples: Vec<SampleType>,
}
impl SampleBuffer {
    /// Creates a silent buffer of the given shape.
    pub fn new_silent(frame_count: usize, channel_count: usize) -> Self {
        Self {
            channel_count,
            samples: vec![0.0; frame_count * channel_count],
        }
    }

    /// Creates an empty buffer that can later be extended with
    /// [SampleBuffer::append()].
    pub fn new_empty(channel_count: usize) -> Self {
        Self {
            channel_count,
            samples: Vec::default(),
        }
    }

    /// Wraps existing interleaved samples. Returns None if the sample count
    /// isn't a whole number of frames.
    pub fn from_interleaved(channel_count: usize, samples: Vec<SampleType>) -> Option<Self> {
        if channel_count == 0 {
            return samples.is_empty().then(|| Self::new_empty(0));
        }
        if samples.len() % channel_count != 0 {
            return None;
        }
        Some(Self {
            channel_count,
            samples,
        })
    }

    #[allow(missing_docs)]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// The number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        if self.channel_count == 0 {
            0
        } else {
            self.samples.len() / self.channel_count
        }
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The raw interleaved samples.
    pub fn samples(&self) -> &[SampleType] {
        &self.samples
    }

    /// Returns the sample at the given frame and channel.
    pub fn get(&self, frame: usize, channel: usize) -> SampleType {
        self.samples[frame * self.channel_count + channel]
    }

    /// Mixes `value` into the given frame and channel. Contributions from
    /// multiple speakers sharing a channel sum.
    pub fn add(&mut self, frame: usize, channel: usize, value: SampleType) {
        self.samples[frame * self.channel_count + channel] += value;
    }

    /// Returns one frame's worth of samples.
    pub fn frame(&self, frame: usize) -> &[SampleType] {
        let start = frame * self.channel_count;
        &self.samples[start..start + self.channel_count]
    }

    /// Iterates over frames.
    pub fn frames(&self) -> impl Iterator<Item = &[SampleType]> {
        // chunks_exact() panics on zero, and a zero-channel buffer has no
        // frames anyway.
        self.samples.chunks_exact(self.channel_count.max(1))
    }

    /// Iterates over a single channel's samples.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = SampleType> + '_ {
        self.frames().map(move |frame| frame[channel])
    }

    /// Concatenates another buffer onto the end of this one. Buffers with a
    /// different channel count are remapped: missing channels are silent and
    /// extra channels are dropped.
    pub fn append(&mut self, other: &SampleBuffer) {
        if other.channel_count == self.channel_count {
            self.samples.extend_from_slice(&other.samples);
            return;
        }
        for frame in other.frames() {
            for c in 0..self.channel_count {
                self.samples.push(frame.get(c).copied().unwrap_or_default());
            }
        }
    }

    /// Appends the given number of silent frames.
    pub fn append_silence(&mut self, frame_count: usize) {
        self.samples
            .resize(self.samples.len() + frame_count * self.channel_count, 0.0);
    }

    /// The largest absolute sample value in the given channel.
    pub fn peak(&self, channel: usize) -> SampleType {
        self.channel(channel)
            .fold(0.0, |peak: SampleType, s| peak.max(s.abs()))
    }

    /// The largest absolute sample value across all channels.
    pub fn overall_peak(&self) -> SampleType {
        self.samples
            .iter()
            .fold(0.0, |peak: SampleType, s| peak.max(s.abs()))
    }

    /// The sum of squared samples across all channels for the given frame.
    pub fn frame_power(&self, frame: usize) -> SampleType {
        self.frame(frame).iter().map(|s| s * s).sum()
    }

    /// Interleaved single-precision samples, the format audio devices and
    /// float WAV files expect.
    pub fn to_f32_interleaved(&self) -> Vec<f32> {
        self.samples.iter().map(|s| *s as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape() {
        let buffer = SampleBuffer::new_silent(10, 3);
        assert_eq!(buffer.frame_count(), 10);
        assert_eq!(buffer.channel_count(), 3);
        assert_eq!(buffer.samples().len(), 30);
        assert_eq!(buffer.overall_peak(), 0.0);

        let empty = SampleBuffer::new_silent(10, 0);
        assert_eq!(empty.frame_count(), 0);
        assert!(empty.is_empty());
        assert_eq!(empty.frames().count(), 0);
    }

    #[test]
    fn add_sums_contributions() {
        let mut buffer = SampleBuffer::new_silent(2, 2);
        buffer.add(1, 1, 0.25);
        buffer.add(1, 1, 0.5);
        assert_eq!(buffer.get(1, 1), 0.75);
        assert_eq!(buffer.get(1, 0), 0.0);
        assert_eq!(buffer.frame(1), &[0.0, 0.75]);
        assert_eq!(buffer.peak(1), 0.75);
    }

    #[test]
    fn append_and_silence() {
        let mut buffer = SampleBuffer::new_empty(2);
        let mut burst = SampleBuffer::new_silent(3, 2);
        burst.add(0, 0, -1.0);
        buffer.append(&burst);
        buffer.append_silence(5);
        assert_eq!(buffer.frame_count(), 8);
        assert_eq!(buffer.get(0, 0), -1.0);
        assert_eq!(buffer.overall_peak(), 1.0);

        // A narrower buffer is padded with silence.
        let mono = SampleBuffer::from_interleaved(1, vec![0.5, 0.5]).unwrap();
        buffer.append(&mono);
        assert_eq!(buffer.frame_count(), 10);
        assert_eq!(buffer.frame(9), &[0.5, 0.0]);
    }

    #[test]
    fn from_interleaved_rejects_partial_frames() {
        assert!(SampleBuffer::from_interleaved(2, vec![0.0; 3]).is_none());
        assert!(SampleBuffer::from_interleaved(2, vec![0.0; 4]).is_some());
        assert!(SampleBuffer::from_interleaved(0, vec![0.0]).is_none());
    }
}
