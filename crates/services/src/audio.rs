// Copyright (c) 2024 Mike Tsao

//! [CpalAudioOutput] plays multi-channel audio through the
//! [cpal](https://crates.io/crates/cpal) audio interface.

use core::{fmt::Debug, str::FromStr};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, Sample as CpalSample, SizedSample, Stream, StreamConfig,
};
use crossbeam::{
    channel::{Receiver, Sender},
    queue::ArrayQueue,
};
use delegate::delegate;
use spatialiser::{
    error::SinkError,
    execution::AudioSink,
    types::{SampleBuffer, SampleRate},
};
use std::{
    sync::{Arc, Mutex},
    thread::JoinHandle,
    time::Duration,
};
use thiserror::Error;

/// The fundamental type of an audio sample sent to the device.
pub type AudioSampleType = f32;

/// Things that can go wrong while opening or running an output device.
#[allow(missing_docs)]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DeviceError {
    #[error("no output device matches {0}")]
    NoDevice(String),
    #[error("{device} has {available} output channels, but {required} are needed")]
    InsufficientChannels {
        device: String,
        available: usize,
        required: usize,
    },
    #[error("{device} can't play {channels} channels at {sample_rate}")]
    UnsupportedConfig {
        device: String,
        channels: usize,
        sample_rate: SampleRate,
    },
    #[error("couldn't query devices: {0}")]
    Enumeration(String),
    #[error("couldn't build the output stream: {0}")]
    BuildStream(String),
    #[error("couldn't start the output stream: {0}")]
    PlayStream(String),
    #[error("the stream thread exited during setup")]
    ThreadExited,
}

/// Which output device to open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DeviceSelector {
    /// The host's default output device. If it has too few channels, the
    /// first output device with enough of them.
    #[default]
    Default,
    /// The nth output device, in the order [list_output_devices()] reports.
    Index(usize),
    /// The first output device whose name contains this text.
    Name(String),
}
impl FromStr for DeviceSelector {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s.is_empty() || s.eq_ignore_ascii_case("default") {
            Self::Default
        } else if let Ok(index) = s.parse::<usize>() {
            Self::Index(index)
        } else {
            Self::Name(s.to_string())
        })
    }
}
impl core::fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Default => write!(f, "the default device"),
            Self::Index(index) => write!(f, "device #{index}"),
            Self::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

/// Summary of one output device.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputDeviceInfo {
    /// Position in the host's device list.
    pub index: usize,
    #[allow(missing_docs)]
    pub name: String,
    /// The most channels any of its configurations offers.
    pub max_channels: usize,
    /// The rate of its default configuration, if it has one.
    pub default_sample_rate: Option<SampleRate>,
    /// Whether this is the host's default output device.
    pub is_default: bool,
}

/// Lists the host's output devices.
pub fn list_output_devices() -> Result<Vec<OutputDeviceInfo>, DeviceError> {
    let host = cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());
    let devices = host
        .output_devices()
        .map_err(|e| DeviceError::Enumeration(e.to_string()))?;
    Ok(devices
        .enumerate()
        .map(|(index, device)| {
            let name = device.name().unwrap_or_else(|_| format!("(device {index})"));
            OutputDeviceInfo {
                index,
                is_default: default_name.as_deref() == Some(name.as_str()),
                max_channels: max_output_channels(&device),
                default_sample_rate: device
                    .default_output_config()
                    .ok()
                    .map(|c| SampleRate::new(c.sample_rate().0 as usize)),
                name,
            }
        })
        .collect())
}

fn max_output_channels(device: &cpal::Device) -> usize {
    device
        .supported_output_configs()
        .map(|configs| configs.map(|c| c.channels() as usize).max().unwrap_or_default())
        .unwrap_or_default()
}

/// A ring buffer of interleaved samples that the audio stream consumes.
struct AudioQueue(Arc<ArrayQueue<AudioSampleType>>);
impl AudioQueue {
    fn new(capacity: usize) -> Self {
        Self(Arc::new(ArrayQueue::new(capacity.max(1))))
    }

    delegate! {
        to self.0 {
            fn len(&self) -> usize;
            fn is_empty(&self) -> bool;
            fn capacity(&self) -> usize;
            fn pop(&self) -> Option<AudioSampleType>;
            fn push(&self, sample: AudioSampleType) -> Result<(), AudioSampleType>;
        }
    }
}
impl Clone for AudioQueue {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}
impl Debug for AudioQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AudioQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// An open stream. The cpal [Stream] itself lives on `thread` because it
/// isn't `Send`; see <https://github.com/RustAudio/cpal/issues/818>.
#[derive(Debug)]
struct RunningStream {
    queue: AudioQueue,
    device_channels: usize,
    stop: Sender<()>,
    errors: Receiver<String>,
    thread: JoinHandle<()>,
}
impl RunningStream {
    fn open(
        selector: DeviceSelector,
        channel_count: usize,
        sample_rate: SampleRate,
        queue_frames: usize,
    ) -> Result<Self, DeviceError> {
        let (setup_sender, setup_receiver) = crossbeam::channel::bounded(1);
        let (stop, stop_receiver) = crossbeam::channel::bounded::<()>(1);
        let (error_sender, errors) = crossbeam::channel::bounded(16);
        let queue_slot: Arc<Mutex<Option<AudioQueue>>> = Arc::default();
        let queue_slot_clone = Arc::clone(&queue_slot);

        let thread = std::thread::spawn(move || {
            match Self::stream_setup_for(&selector, channel_count, sample_rate, queue_frames, error_sender) {
                Ok((stream, queue, device_channels)) => {
                    if let Ok(mut slot) = queue_slot_clone.lock() {
                        *slot = Some(queue);
                    }
                    let _ = setup_sender.send(Ok(device_channels));
                    // Park until asked to stop or until the owner goes away.
                    let _ = stop_receiver.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = setup_sender.send(Err(e));
                }
            }
        });

        let device_channels = setup_receiver
            .recv()
            .map_err(|_| DeviceError::ThreadExited)??;
        let queue = queue_slot
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or(DeviceError::ThreadExited)?;
        Ok(Self {
            queue,
            device_channels,
            stop,
            errors,
            thread,
        })
    }

    fn close(self) {
        let _ = self.stop.send(());
        if self.thread.join().is_err() {
            log::error!("audio stream thread panicked");
        }
    }

    fn find_device(host: &cpal::Host, selector: &DeviceSelector) -> Result<cpal::Device, DeviceError> {
        let not_found = || DeviceError::NoDevice(selector.to_string());
        match selector {
            DeviceSelector::Default => host.default_output_device().ok_or_else(not_found),
            DeviceSelector::Index(index) => host
                .output_devices()
                .map_err(|e| DeviceError::Enumeration(e.to_string()))?
                .nth(*index)
                .ok_or_else(not_found),
            DeviceSelector::Name(name) => host
                .output_devices()
                .map_err(|e| DeviceError::Enumeration(e.to_string()))?
                .find(|d| d.name().is_ok_and(|n| n.contains(name.as_str())))
                .ok_or_else(not_found),
        }
    }

    /// The first output device with at least `channel_count` channels, for
    /// when the default device is too narrow.
    fn find_wide_enough(
        host: &cpal::Host,
        channel_count: usize,
    ) -> Result<Option<cpal::Device>, DeviceError> {
        let devices: Vec<cpal::Device> = host
            .output_devices()
            .map_err(|e| DeviceError::Enumeration(e.to_string()))?
            .collect();
        let candidates: Vec<(String, usize)> = devices
            .iter()
            .map(|d| (d.name().unwrap_or_default(), max_output_channels(d)))
            .collect();
        Ok(
            first_wide_enough(&candidates, channel_count).and_then(|index| {
                log::info!(
                    "default output has too few channels; using {} ({} channels)",
                    candidates[index].0,
                    candidates[index].1
                );
                devices.into_iter().nth(index)
            }),
        )
    }

    /// Picks the device and a configuration with at least `channel_count`
    /// channels at `sample_rate`, then builds and starts the stream. Returns
    /// the stream, the queue that feeds it, and the device's channel count.
    fn stream_setup_for(
        selector: &DeviceSelector,
        channel_count: usize,
        sample_rate: SampleRate,
        queue_frames: usize,
        errors: Sender<String>,
    ) -> Result<(Stream, AudioQueue, usize), DeviceError> {
        let host = cpal::default_host();
        let mut device = Self::find_device(&host, selector)?;
        if *selector == DeviceSelector::Default && max_output_channels(&device) < channel_count {
            if let Some(wider) = Self::find_wide_enough(&host, channel_count)? {
                device = wider;
            }
        }
        let device_name = device.name().unwrap_or_else(|_| selector.to_string());

        let available = max_output_channels(&device);
        if available < channel_count {
            return Err(DeviceError::InsufficientChannels {
                device: device_name,
                available,
                required: channel_count,
            });
        }

        let rate = cpal::SampleRate(u32::from(sample_rate));
        let supported = device
            .supported_output_configs()
            .map_err(|e| DeviceError::Enumeration(e.to_string()))?
            .filter(|c| {
                c.channels() as usize >= channel_count
                    && c.min_sample_rate() <= rate
                    && rate <= c.max_sample_rate()
            })
            .min_by_key(|c| (c.channels(), c.sample_format() != cpal::SampleFormat::F32))
            .ok_or_else(|| DeviceError::UnsupportedConfig {
                device: device_name.clone(),
                channels: channel_count,
                sample_rate,
            })?
            .with_sample_rate(rate);

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let device_channels = config.channels as usize;
        let queue = AudioQueue::new(queue_frames * device_channels);

        let stream = match sample_format {
            cpal::SampleFormat::I8 => Self::stream_make::<i8>(&config, &device, &queue, errors),
            cpal::SampleFormat::I16 => Self::stream_make::<i16>(&config, &device, &queue, errors),
            cpal::SampleFormat::I32 => Self::stream_make::<i32>(&config, &device, &queue, errors),
            cpal::SampleFormat::I64 => Self::stream_make::<i64>(&config, &device, &queue, errors),
            cpal::SampleFormat::U8 => Self::stream_make::<u8>(&config, &device, &queue, errors),
            cpal::SampleFormat::U16 => Self::stream_make::<u16>(&config, &device, &queue, errors),
            cpal::SampleFormat::U32 => Self::stream_make::<u32>(&config, &device, &queue, errors),
            cpal::SampleFormat::U64 => Self::stream_make::<u64>(&config, &device, &queue, errors),
            cpal::SampleFormat::F32 => Self::stream_make::<f32>(&config, &device, &queue, errors),
            cpal::SampleFormat::F64 => Self::stream_make::<f64>(&config, &device, &queue, errors),
            _ => Err(DeviceError::UnsupportedConfig {
                device: device_name.clone(),
                channels: channel_count,
                sample_rate,
            }),
        }?;
        stream
            .play()
            .map_err(|e| DeviceError::PlayStream(e.to_string()))?;
        log::info!(
            "opened {device_name}: {device_channels} channels at {sample_rate} ({sample_format:?})"
        );
        Ok((stream, queue, device_channels))
    }

    /// Generic portion of stream_setup_for().
    fn stream_make<T>(
        config: &StreamConfig,
        device: &cpal::Device,
        queue: &AudioQueue,
        errors: Sender<String>,
    ) -> Result<Stream, DeviceError>
    where
        T: SizedSample + FromSample<AudioSampleType>,
    {
        let queue = queue.clone();
        let err_fn = move |err: cpal::StreamError| {
            log::error!("output stream error: {err}");
            let _ = errors.try_send(err.to_string());
        };
        device
            .build_output_stream(
                config,
                move |output: &mut [T], _: &cpal::OutputCallbackInfo| Self::on_window(output, &queue),
                err_fn,
                None,
            )
            .map_err(|e| DeviceError::BuildStream(e.to_string()))
    }

    /// cpal callback that supplies samples from the AudioQueue, converting them
    /// if needed to the stream's expected data type. Runs out as silence.
    fn on_window<T>(output: &mut [T], queue: &AudioQueue)
    where
        T: CpalSample + FromSample<AudioSampleType>,
    {
        for sample in output.iter_mut() {
            *sample = queue
                .pop()
                .map(T::from_sample)
                .unwrap_or(T::EQUILIBRIUM);
        }
    }
}

/// Plays [SampleBuffer]s on an output device. Writes block until the device
/// has consumed the audio.
///
/// Starting and stopping are idempotent. Only one stream is open at a time;
/// selecting another device closes the current stream first. A stream error
/// closes the stream, and the next write reports it.
#[derive(Debug)]
pub struct CpalAudioOutput {
    selector: DeviceSelector,
    channel_count: usize,
    sample_rate: SampleRate,

    stream: Mutex<Option<RunningStream>>,
}
impl CpalAudioOutput {
    /// How much audio the queue holds ahead of the device, in seconds' worth
    /// of frames divided by this.
    const QUEUE_FRACTION_OF_SECOND: usize = 4;

    /// How long a blocked writer waits before checking the queue again.
    const POLL_INTERVAL: Duration = Duration::from_millis(2);

    /// Describes an output without opening it. Call [CpalAudioOutput::start()]
    /// to open the device.
    pub fn new_with(selector: DeviceSelector, channel_count: usize, sample_rate: SampleRate) -> Self {
        Self {
            selector,
            channel_count,
            sample_rate,
            stream: Mutex::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn selector(&self) -> &DeviceSelector {
        &self.selector
    }

    #[allow(missing_docs)]
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Whether a stream is open.
    pub fn is_running(&self) -> bool {
        self.stream.lock().map(|s| s.is_some()).unwrap_or_default()
    }

    /// Opens the device and starts the stream. Does nothing if it's already
    /// running.
    pub fn start(&self) -> Result<(), DeviceError> {
        let Ok(mut stream) = self.stream.lock() else {
            return Err(DeviceError::ThreadExited);
        };
        if stream.is_none() {
            *stream = Some(RunningStream::open(
                self.selector.clone(),
                self.channel_count,
                self.sample_rate,
                self.sample_rate.0 / Self::QUEUE_FRACTION_OF_SECOND,
            )?);
        }
        Ok(())
    }

    /// Closes the stream. Does nothing if it isn't running.
    pub fn stop(&self) {
        let running = self.stream.lock().ok().and_then(|mut s| s.take());
        if let Some(running) = running {
            running.close();
            log::debug!("closed output stream on {}", self.selector);
        }
    }

    /// Closes any open stream and switches to another device. The new device
    /// isn't opened until [CpalAudioOutput::start()].
    pub fn select_device(&mut self, selector: DeviceSelector) {
        self.stop();
        self.selector = selector;
    }

    fn fail(&self, message: String) -> SinkError {
        self.stop();
        SinkError::Device(message)
    }
}
impl Drop for CpalAudioOutput {
    fn drop(&mut self) {
        self.stop();
    }
}
impl AudioSink for CpalAudioOutput {
    fn is_realtime(&self) -> bool {
        true
    }

    fn channel_count(&self) -> usize {
        self.channel_count
    }

    fn write(&mut self, buffer: &SampleBuffer) -> Result<(), SinkError> {
        if buffer.channel_count() > self.channel_count {
            return Err(SinkError::ChannelMismatch {
                buffer: buffer.channel_count(),
                sink: self.channel_count,
            });
        }
        let (queue, errors, device_channels) = match self.stream.lock() {
            Ok(stream) => match stream.as_ref() {
                Some(s) => (s.queue.clone(), s.errors.clone(), s.device_channels),
                None => return Err(SinkError::NotRunning),
            },
            Err(_) => return Err(SinkError::NotRunning),
        };

        let samples = interleave_for_device(buffer, device_channels);
        let mut pending = samples.iter();
        let mut next = pending.next();
        while let Some(sample) = next {
            if let Ok(message) = errors.try_recv() {
                return Err(self.fail(message));
            }
            if queue.push(*sample).is_ok() {
                next = pending.next();
            } else {
                std::thread::sleep(Self::POLL_INTERVAL);
            }
        }
        while !queue.is_empty() {
            if let Ok(message) = errors.try_recv() {
                return Err(self.fail(message));
            }
            std::thread::sleep(Self::POLL_INTERVAL);
        }
        Ok(())
    }
}

/// Index of the first `(name, max_channels)` entry with at least
/// `channel_count` channels.
fn first_wide_enough(devices: &[(String, usize)], channel_count: usize) -> Option<usize> {
    devices
        .iter()
        .position(|(_, channels)| *channels >= channel_count)
}

/// Converts a buffer to interleaved f32 samples with `device_channels` per
/// frame, padding missing channels with silence.
fn interleave_for_device(buffer: &SampleBuffer, device_channels: usize) -> Vec<AudioSampleType> {
    if buffer.channel_count() == device_channels {
        return buffer.to_f32_interleaved();
    }
    let mut samples = Vec::with_capacity(buffer.frame_count() * device_channels);
    for frame in buffer.frames() {
        samples.extend((0..device_channels).map(|c| frame.get(c).copied().unwrap_or_default() as f32));
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_queue() {
        let queue = AudioQueue::new(2);
        assert_eq!(queue.pop(), None);

        assert!(queue.push(0.5).is_ok());
        assert!(queue.push(-0.5).is_ok());
        assert_eq!(queue.push(0.25), Err(0.25));
        assert_eq!(queue.pop(), Some(0.5));
        assert_eq!(queue.clone().len(), 1);
    }

    #[test]
    fn device_selectors() {
        assert_eq!("".parse::<DeviceSelector>(), Ok(DeviceSelector::Default));
        assert_eq!("DEFAULT".parse::<DeviceSelector>(), Ok(DeviceSelector::Default));
        assert_eq!("11".parse::<DeviceSelector>(), Ok(DeviceSelector::Index(11)));
        assert_eq!(
            " MCHStreamer ".parse::<DeviceSelector>(),
            Ok(DeviceSelector::Name("MCHStreamer".to_string()))
        );
        assert_eq!(DeviceSelector::Index(3).to_string(), "device #3");
    }

    #[test]
    fn narrow_defaults_fall_back_to_a_wider_device() {
        let devices = vec![
            ("Speakers".to_string(), 2),
            ("HDMI".to_string(), 8),
            ("MCHStreamer".to_string(), 16),
            ("Dante".to_string(), 64),
        ];
        assert_eq!(first_wide_enough(&devices, 16), Some(2));
        assert_eq!(first_wide_enough(&devices, 2), Some(0));
        assert_eq!(first_wide_enough(&devices, 65), None);
        assert_eq!(first_wide_enough(&[], 1), None);
    }

    #[test]
    fn frames_are_padded_to_the_device() {
        let buffer = SampleBuffer::from_interleaved(2, vec![0.5, -0.5, 0.25, -0.25]).unwrap();
        assert_eq!(
            interleave_for_device(&buffer, 4),
            vec![0.5, -0.5, 0.0, 0.0, 0.25, -0.25, 0.0, 0.0]
        );
        assert_eq!(interleave_for_device(&buffer, 2), vec![0.5, -0.5, 0.25, -0.25]);
    }

    #[test]
    fn writes_require_a_running_stream() {
        let mut output = CpalAudioOutput::new_with(DeviceSelector::Default, 2, SampleRate::DEFAULT);
        assert!(!output.is_running());
        assert!(output.is_realtime());
        assert!(matches!(
            output.write(&SampleBuffer::new_silent(10, 2)),
            Err(SinkError::NotRunning)
        ));
        assert!(matches!(
            output.write(&SampleBuffer::new_silent(10, 3)),
            Err(SinkError::ChannelMismatch { buffer: 3, sink: 2 })
        ));
        output.stop();
        output.select_device(DeviceSelector::Index(1));
        assert_eq!(output.selector(), &DeviceSelector::Index(1));
    }
}
