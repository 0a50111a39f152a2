// Copyright (c) 2024 Mike Tsao

//! Converts a 2-D source position into a per-speaker gain and delay.
//!
//! A [SpatializationEngine] pairs a [SpeakerLayout](crate::layout::SpeakerLayout)
//! with one [SpatializationMethod]. It has no mutable state; changing the
//! layout or the method means building a new engine.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        DistancePanParams, GainDelayVector, ItdIldParams, MethodKind, SpatializationEngine,
        SpatializationMethod, TactileFalloff, TactileGridParams,
    };
}

pub use {
    engine::{GainDelayVector, MethodKind, SpatializationEngine, SpatializationMethod},
    params::{
        DistancePanParams, DistancePanParamsBuilder, ItdIldParams, ItdIldParamsBuilder,
        TactileFalloff, TactileGridParams, TactileGridParamsBuilder,
    },
};

pub(crate) use methods::ACTIVE_GAIN_THRESHOLD;

mod engine;
mod methods;
mod params;
