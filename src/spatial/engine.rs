// Copyright (c) 2024 Mike Tsao

use super::{methods, DistancePanParams, ItdIldParams, TactileGridParams};
use crate::{error::ParseError, layout::SpeakerLayout, types::Position};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Per-speaker gains and delays for one source position. Both vectors are
/// indexed in [SpeakerLayout] order and always have the same length as the
/// layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GainDelayVector {
    /// Amplitude multipliers.
    pub gains: Vec<f64>,
    /// Time offsets in seconds. May be negative.
    pub delays: Vec<f64>,
}
impl GainDelayVector {
    /// All gains and delays zero.
    pub fn new_silent(speaker_count: usize) -> Self {
        Self {
            gains: vec![0.0; speaker_count],
            delays: vec![0.0; speaker_count],
        }
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.gains.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    /// The sum of squared gains.
    pub fn total_power(&self) -> f64 {
        self.gains.iter().map(|g| g * g).sum()
    }

    /// Speakers whose gain exceeds `threshold`, as (index, gain, delay).
    pub fn active(&self, threshold: f64) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.gains
            .iter()
            .zip(self.delays.iter())
            .enumerate()
            .filter(move |(_, (gain, _))| **gain > threshold)
            .map(|(i, (gain, delay))| (i, *gain, *delay))
    }
}

/// The name of a spatialization method, without its coefficients. This is
/// what configuration files and the command line refer to.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MethodKind {
    /// Smooth weighting tuned for dense transducer grids.
    #[default]
    TactileGrid,
    /// Vector-base amplitude panning between the two angularly nearest
    /// speakers.
    Vbap,
    /// Inverse-distance amplitude panning.
    DistancePan,
    /// Only the closest speaker plays.
    NearestNeighbor,
    /// Interaural time and level differences for a two-transducer setup.
    ItdIld,
}
impl MethodKind {
    /// Parses a method name case-insensitively.
    pub fn parse(name: &str) -> Result<Self, ParseError> {
        Self::from_str(&name.trim().to_ascii_lowercase())
            .map_err(|_| ParseError::UnknownMethod(name.trim().to_string()))
    }
}

/// A spatialization method together with its tunable coefficients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SpatializationMethod {
    #[allow(missing_docs)]
    TactileGrid(TactileGridParams),
    #[allow(missing_docs)]
    Vbap,
    #[allow(missing_docs)]
    DistancePan(DistancePanParams),
    #[allow(missing_docs)]
    NearestNeighbor,
    #[allow(missing_docs)]
    ItdIld(ItdIldParams),
}
impl Default for SpatializationMethod {
    fn default() -> Self {
        Self::TactileGrid(TactileGridParams::default())
    }
}
impl From<MethodKind> for SpatializationMethod {
    fn from(kind: MethodKind) -> Self {
        match kind {
            MethodKind::TactileGrid => Self::TactileGrid(Default::default()),
            MethodKind::Vbap => Self::Vbap,
            MethodKind::DistancePan => Self::DistancePan(Default::default()),
            MethodKind::NearestNeighbor => Self::NearestNeighbor,
            MethodKind::ItdIld => Self::ItdIld(Default::default()),
        }
    }
}
impl SpatializationMethod {
    #[allow(missing_docs)]
    pub fn kind(&self) -> MethodKind {
        match self {
            Self::TactileGrid(_) => MethodKind::TactileGrid,
            Self::Vbap => MethodKind::Vbap,
            Self::DistancePan(_) => MethodKind::DistancePan,
            Self::NearestNeighbor => MethodKind::NearestNeighbor,
            Self::ItdIld(_) => MethodKind::ItdIld,
        }
    }

    /// Evaluates this method for one source position.
    pub fn compute(&self, speakers: &[Position], source: &Position) -> GainDelayVector {
        match self {
            Self::TactileGrid(params) => methods::tactile_grid(speakers, source, params),
            Self::Vbap => methods::vbap(speakers, source),
            Self::DistancePan(params) => methods::distance_pan(speakers, source, params),
            Self::NearestNeighbor => methods::nearest_neighbor(speakers, source),
            Self::ItdIld(params) => methods::itd_ild(speakers, source, params),
        }
    }
}

/// Computes [GainDelayVector]s for a fixed [SpeakerLayout].
#[derive(Clone, Debug, Default)]
pub struct SpatializationEngine {
    layout: SpeakerLayout,
    method: SpatializationMethod,

    // Cached from the layout so compute() doesn't collect on every call.
    positions: Vec<Position>,
}
impl SpatializationEngine {
    #[allow(missing_docs)]
    pub fn new_with(layout: SpeakerLayout, method: SpatializationMethod) -> Self {
        let positions = layout.positions();
        Self {
            layout,
            method,
            positions,
        }
    }

    #[allow(missing_docs)]
    pub fn layout(&self) -> &SpeakerLayout {
        &self.layout
    }

    #[allow(missing_docs)]
    pub fn method(&self) -> &SpatializationMethod {
        &self.method
    }

    /// The number of output channels: one more than the highest channel
    /// index in the layout.
    pub fn channel_count(&self) -> usize {
        self.layout.channel_count()
    }

    /// Gains and delays for a source at `position`. An empty layout yields
    /// empty vectors, which callers treat as silence.
    pub fn compute(&self, position: &Position) -> GainDelayVector {
        self.method.compute(&self.positions, position)
    }
}
