// Copyright (c) 2024 Mike Tsao

//! Turns position and frequency trajectories into multi-channel audio.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{BufferSynthesizer, FadeWindow, PathMode, Trajectory};
}

pub use {
    synthesizer::BufferSynthesizer,
    trajectory::{circle_position, step_fraction, PathMode, Trajectory},
    window::FadeWindow,
};

mod synthesizer;
mod trajectory;
mod window;
