// Copyright (c) 2024 Mike Tsao

//! Numeric types used throughout the system.

use core::fmt;
use core::ops::{Add, Mul, Sub};
use serde::{Deserialize, Serialize};

/// The primitive Rust type of a single audio sample. Buffers stay in this
/// type until they reach a device or a file.
pub type SampleType = f64;

/// Use [ParameterType] for plain numeric parameters like amplitudes, gains and
/// exponents.
pub type ParameterType = f64;

/// Hertz. Any non-negative number. 440 = A4
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrequencyHz(pub ParameterType);
impl FrequencyHz {
    /// Linear interpolation between two frequencies. `t` is expected to be in
    /// [0.0, 1.0].
    pub fn lerp(start: Self, end: Self, t: f64) -> Self {
        Self(start.0 * (1.0 - t) + end.0 * t)
    }
}
impl fmt::Display for FrequencyHz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:0.2} Hz", self.0))
    }
}
impl From<f64> for FrequencyHz {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl From<f32> for FrequencyHz {
    fn from(value: f32) -> Self {
        Self(value as f64)
    }
}
impl From<FrequencyHz> for f64 {
    fn from(value: FrequencyHz) -> Self {
        value.0
    }
}
impl Add for FrequencyHz {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl Sub for FrequencyHz {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl Mul<f64> for FrequencyHz {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}
