// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about various parts of the
//! system. Intended to be serialized.

use crate::types::{SampleRate, Seconds};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Controls how the buffer synthesizer shapes its output.
#[derive(Clone, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct SynthesisSettings {
    /// Output sample rate for both devices and files.
    pub sample_rate: SampleRate,

    /// Length of one discrete burst.
    #[derivative(Default(value = "Seconds(0.1)"))]
    pub tone_duration: Seconds,

    /// Length of the raised-cosine fade at each end of a buffer. Bursts
    /// shorter than twice this fade for half their length instead.
    #[derivative(Default(value = "Seconds(0.05)"))]
    pub fade_duration: Seconds,

    /// How often continuous buffers recompute spatialization. Smaller
    /// segments track the path more closely and cost more.
    #[derivative(Default(value = "Seconds(0.01)"))]
    pub segment_duration: Seconds,
}
impl SynthesisSettings {
    /// Returns the currently selected audio sample rate, in Hertz (samples per
    /// second).
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// The fade length in frames, before it is limited by a buffer's length.
    pub fn fade_frames(&self) -> usize {
        self.sample_rate.frames_for(self.fade_duration)
    }

    /// The segment length in frames. Never zero.
    pub fn segment_frames(&self) -> usize {
        self.sample_rate.frames_for(self.segment_duration).max(1)
    }
}

/// Controls how the script executor paces itself and reports progress.
#[derive(Clone, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExecutionSettings {
    /// The most telemetry events a single continuous action emits.
    #[derivative(Default(value = "100"))]
    pub telemetry_update_cap: usize,

    /// Capacity of the telemetry queue. Events are dropped, not waited on,
    /// when an observer falls behind.
    #[derivative(Default(value = "256"))]
    pub telemetry_queue_capacity: usize,
}
