// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::{BoundedCrossbeamChannel, ExecutionSettings, SynthesisSettings};
}

pub use channels::BoundedCrossbeamChannel;
pub use settings::{ExecutionSettings, SynthesisSettings};

pub(crate) use directive::{parse_f64, parse_point, Directive, Line};

mod channels;
mod directive;
mod settings;
