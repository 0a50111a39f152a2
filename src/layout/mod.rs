// Copyright (c) 2024 Mike Tsao

//! Describes where the transducers are and which output channel drives each
//! one.
//!
//! A [SpeakerLayout] can be built procedurally with [grid()], [circle()], and
//! [line()], read from the line-oriented text format with
//! [LayoutConfig::parse()], or deserialized with serde.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{LayoutConfig, LayoutWarning, Speaker, SpeakerLayout};
}

pub use {
    config::LayoutConfig,
    generators::{circle, default_grid, grid, line},
    speaker::{LayoutWarning, Speaker, SpeakerLayout},
};

mod config;
mod generators;
mod speaker;
