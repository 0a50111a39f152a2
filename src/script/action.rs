// Copyright (c) 2024 Mike Tsao

use crate::{
    synthesis::Trajectory,
    types::{FrequencyHz, Position, Seconds},
};
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;

/// One step of a script's timeline.
///
/// Stepped actions keep `steps` signed so that a nonpositive count survives
/// parsing and can be reported when it is executed.
#[derive(Clone, Debug, PartialEq, IntoStaticStr, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    /// Silence.
    Wait {
        #[allow(missing_docs)]
        duration: Seconds,
    },
    /// Moves the source without making a sound.
    Jump {
        #[allow(missing_docs)]
        position: Position,
    },
    /// A single burst at one position.
    Sound {
        #[allow(missing_docs)]
        position: Position,
        #[allow(missing_docs)]
        frequency: FrequencyHz,
        #[allow(missing_docs)]
        amplitude: f64,
    },
    /// `steps` bursts spread along a path over `duration`.
    Arc {
        #[allow(missing_docs)]
        path: Trajectory,
        #[allow(missing_docs)]
        duration: Seconds,
        #[allow(missing_docs)]
        steps: i64,
        #[allow(missing_docs)]
        frequency: FrequencyHz,
        #[allow(missing_docs)]
        amplitude: f64,
    },
    /// One continuous revolution around the origin. `steps` only sets how
    /// often progress is reported.
    CircleSweep {
        #[allow(missing_docs)]
        radius: f64,
        #[allow(missing_docs)]
        duration: Seconds,
        #[allow(missing_docs)]
        steps: i64,
        #[allow(missing_docs)]
        frequency: FrequencyHz,
        #[allow(missing_docs)]
        amplitude: f64,
    },
    /// `steps` bursts at one position, stepping from one frequency to
    /// another.
    FreqRamp {
        #[allow(missing_docs)]
        position: Position,
        #[allow(missing_docs)]
        start_frequency: FrequencyHz,
        #[allow(missing_docs)]
        end_frequency: FrequencyHz,
        #[allow(missing_docs)]
        duration: Seconds,
        #[allow(missing_docs)]
        steps: i64,
        #[allow(missing_docs)]
        amplitude: f64,
    },
    /// A continuous glide at one position.
    FreqRampSmooth {
        #[allow(missing_docs)]
        position: Position,
        #[allow(missing_docs)]
        start_frequency: FrequencyHz,
        #[allow(missing_docs)]
        end_frequency: FrequencyHz,
        #[allow(missing_docs)]
        duration: Seconds,
        #[allow(missing_docs)]
        amplitude: f64,
    },
    /// A continuous glide while moving along a path.
    PathFreqRamp {
        #[allow(missing_docs)]
        path: Trajectory,
        #[allow(missing_docs)]
        start_frequency: FrequencyHz,
        #[allow(missing_docs)]
        end_frequency: FrequencyHz,
        #[allow(missing_docs)]
        duration: Seconds,
        #[allow(missing_docs)]
        steps: i64,
        #[allow(missing_docs)]
        amplitude: f64,
    },
    /// Anything deserialization didn't recognize. Skipped at execution.
    #[serde(other)]
    Unknown,
}
impl Action {
    /// The snake_case name of this kind of action, as used in serialized
    /// form and in telemetry.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// The nominal length of this action, when it has one.
    pub fn duration(&self) -> Option<Seconds> {
        match self {
            Action::Wait { duration }
            | Action::Arc { duration, .. }
            | Action::CircleSweep { duration, .. }
            | Action::FreqRamp { duration, .. }
            | Action::FreqRampSmooth { duration, .. }
            | Action::PathFreqRamp { duration, .. } => Some(*duration),
            Action::Jump { .. } | Action::Sound { .. } | Action::Unknown => None,
        }
    }
}
