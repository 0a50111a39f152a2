// Copyright (c) 2024 Mike Tsao

//! Runs a script's actions against an [AudioSink].
//!
//! The [ScriptExecutor] is a small state machine. Its only state is the
//! current source position and the last frequency played, both updated as
//! actions run. Everything else comes from its [BufferSynthesizer](crate::synthesis::BufferSynthesizer).

/// The most commonly used imports.
pub mod prelude {
    pub use super::{AudioSink, ExecutionSummary, OfflineRenderer, ScriptExecutor, TelemetryEvent};
}

pub use {
    executor::{ExecutionSummary, ScriptExecutor},
    sink::{AudioSink, OfflineRenderer},
    telemetry::TelemetryEvent,
};

mod executor;
mod sink;
mod telemetry;
