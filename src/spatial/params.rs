// Copyright (c) 2024 Mike Tsao

//! Tunable coefficients for each spatialization method.

use crate::error::ParseError;
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// How [TactileGridParams] turns distances into weights.
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
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "snake_case")]
pub enum TactileFalloff {
    /// Smoothed inverse distance over the K nearest speakers.
    #[default]
    InverseDistance,
    /// A Gaussian bump over every speaker. Smoothest, least localized.
    Gaussian,
}

/// Coefficients for the tactile-grid method. The defaults were chosen so that
/// loudness stays continuous as a source crosses from one transducer's
/// neighborhood into the next.
#[derive(Clone, Debug, Builder, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case", default)]
pub struct TactileGridParams {
    /// Which weighting curve to use.
    pub falloff: TactileFalloff,

    /// The K in "K nearest speakers". Inverse-distance falloff only.
    #[derivative(Default(value = "6"))]
    pub max_active_speakers: usize,

    /// Added to every distance before weighting, in meters. Larger values
    /// spread energy over more transducers.
    #[derivative(Default(value = "0.008"))]
    pub smooth_min_distance: f64,

    /// Exponent of the inverse-distance curve.
    #[derivative(Default(value = "1.5"))]
    pub distance_power: f64,

    /// Multiplier applied to every active weight after normalization.
    #[derivative(Default(value = "1.2"))]
    pub enhancement: f64,

    /// Standard deviation of the Gaussian falloff, in meters.
    #[derivative(Default(value = "0.025"))]
    pub gaussian_sigma: f64,
}
impl TactileGridParams {
    /// The names accepted by [TactileGridParams::set_by_name()].
    pub const PARAMETER_NAMES: [&'static str; 6] = [
        "use_gaussian",
        "gaussian_sigma",
        "max_active_speakers",
        "smooth_min_distance",
        "distance_power",
        "tactile_enhancement",
    ];

    /// Updates one coefficient from its textual name and value. This is the
    /// runtime tuning surface used by scripts and the command line.
    pub fn set_by_name(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        let number = || {
            value.trim().parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                field: name.to_string(),
                value: value.to_string(),
            })
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "use_gaussian" => {
                let on = match value.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => {
                        return Err(ParseError::InvalidNumber {
                            field: name.to_string(),
                            value: value.to_string(),
                        })
                    }
                };
                self.falloff = if on {
                    TactileFalloff::Gaussian
                } else {
                    TactileFalloff::InverseDistance
                };
            }
            "gaussian_sigma" => self.gaussian_sigma = number()?,
            "max_active_speakers" => self.max_active_speakers = number()?.max(0.0) as usize,
            "smooth_min_distance" => self.smooth_min_distance = number()?,
            "distance_power" => self.distance_power = number()?,
            "tactile_enhancement" | "enhancement" => self.enhancement = number()?,
            _ => return Err(ParseError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }
}

/// Coefficients for distance-based amplitude panning.
#[derive(Clone, Debug, Builder, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case", default)]
pub struct DistancePanParams {
    /// Exponent of the inverse-distance law. 2.0 is the inverse-square law.
    #[derivative(Default(value = "2.0"))]
    pub rolloff: f64,
}

/// Coefficients for the interaural time/level difference method.
#[derive(Clone, Debug, Builder, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case", default)]
pub struct ItdIldParams {
    /// Meters per second.
    #[derivative(Default(value = "343.0"))]
    pub speed_of_sound: f64,

    /// Scales the time difference between the two transducers. Values above
    /// 1.0 make direction easier to feel.
    #[derivative(Default(value = "1.0"))]
    pub itd_exaggeration: f64,

    /// Exponent applied to the distance ratio for the farther transducer.
    #[derivative(Default(value = "1.0"))]
    pub ild_exponent: f64,
}
