// Copyright (c) 2024 Mike Tsao

use crate::types::{FrequencyHz, Position};
use serde::Serialize;

/// A snapshot of where the source is and what it sounds like, published for
/// observers such as visualizers. Audio doesn't depend on these.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelemetryEvent {
    #[allow(missing_docs)]
    pub position: Position,
    #[allow(missing_docs)]
    pub frequency: FrequencyHz,
    #[allow(missing_docs)]
    pub amplitude: f64,
    /// The name of the action that produced this event, such as `arc`.
    pub source: &'static str,
}
