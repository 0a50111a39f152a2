// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        FrequencyHz, ParameterType, Position, PositionExt, SampleBuffer, SampleRate, SampleType,
        Seconds,
    };
}

pub use {
    buffer::SampleBuffer,
    numbers::{FrequencyHz, ParameterType, SampleType},
    position::{Position, PositionExt},
    time::{SampleRate, Seconds},
};

mod buffer;
mod numbers;
mod position;
mod time;
