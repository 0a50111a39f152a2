// Copyright (c) 2024 Mike Tsao

use crate::{error::SinkError, types::SampleBuffer};

/// Somewhere for rendered audio to go.
///
/// Realtime sinks block in [AudioSink::write()] until the device has played
/// the buffer. Offline sinks return as soon as they've stored it. The
/// executor uses [AudioSink::is_realtime()] to decide whether to wait
/// between actions or to fill the gap with silence.
pub trait AudioSink: Send {
    /// Whether writes are paced by a device clock.
    fn is_realtime(&self) -> bool;

    /// How many channels each frame carries.
    fn channel_count(&self) -> usize;

    /// Consumes one buffer. Buffers with fewer channels than the sink are
    /// padded with silence; more channels is an error.
    fn write(&mut self, buffer: &SampleBuffer) -> Result<(), SinkError>;
}

/// Accumulates everything written to it into one long buffer.
///
/// A zero-channel renderer, as built for an empty layout, holds no frames at
/// all: silence and tones alike add nothing, so the timeline has no length.
#[derive(Clone, Debug, Default)]
pub struct OfflineRenderer {
    buffer: SampleBuffer,
}
impl OfflineRenderer {
    #[allow(missing_docs)]
    pub fn new_with(channel_count: usize) -> Self {
        Self {
            buffer: SampleBuffer::new_empty(channel_count),
        }
    }

    /// Everything rendered so far.
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    #[allow(missing_docs)]
    pub fn into_buffer(self) -> SampleBuffer {
        self.buffer
    }
}
impl AudioSink for OfflineRenderer {
    fn is_realtime(&self) -> bool {
        false
    }

    fn channel_count(&self) -> usize {
        self.buffer.channel_count()
    }

    fn write(&mut self, buffer: &SampleBuffer) -> Result<(), SinkError> {
        if buffer.channel_count() > self.buffer.channel_count() {
            return Err(SinkError::ChannelMismatch {
                buffer: buffer.channel_count(),
                sink: self.buffer.channel_count(),
            });
        }
        self.buffer.append(buffer);
        Ok(())
    }
}
