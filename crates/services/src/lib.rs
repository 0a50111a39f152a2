// Copyright (c) 2024 Mike Tsao

//! Realtime output for spatialiser. [CpalAudioOutput] opens a multi-channel
//! device with [cpal](https://crates.io/crates/cpal) and plays
//! [SampleBuffer](spatialiser::types::SampleBuffer)s through it as an
//! [AudioSink](spatialiser::execution::AudioSink).

#![deny(missing_docs)]

/// The most commonly used imports.
pub mod prelude {
    #[cfg(feature = "audio")]
    pub use super::{list_output_devices, CpalAudioOutput, DeviceError, DeviceSelector};
}

#[cfg(feature = "audio")]
pub use audio::{
    list_output_devices, AudioSampleType, CpalAudioOutput, DeviceError, DeviceSelector,
    OutputDeviceInfo,
};

#[cfg(feature = "audio")]
mod audio;
