// Copyright (c) 2024 Mike Tsao

//! Handles digital-audio and wall-clock time.

use core::{
    fmt,
    ops::{Div, Mul, Sub},
};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Represents the [seconds](https://en.wikipedia.org/wiki/Second) unit of time.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Seconds(pub f64);
impl Seconds {
    /// Zero seconds.
    pub const fn zero() -> Seconds {
        Seconds(0.0)
    }

    /// Whether this span is long enough to produce any audio.
    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }

    /// Converts to a [Duration] for sleeping. Negative and non-finite values
    /// become zero.
    pub fn to_duration(&self) -> Duration {
        if self.0.is_finite() && self.0 > 0.0 {
            Duration::from_secs_f64(self.0)
        } else {
            Duration::ZERO
        }
    }
}
impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:0.3}s", self.0))
    }
}
impl From<f64> for Seconds {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl From<f32> for Seconds {
    fn from(value: f32) -> Self {
        Self(value as f64)
    }
}
impl From<Seconds> for f64 {
    fn from(value: Seconds) -> Self {
        value.0
    }
}
impl From<Duration> for Seconds {
    fn from(value: Duration) -> Self {
        Self(value.as_secs_f64())
    }
}
impl Div<usize> for Seconds {
    type Output = Self;

    fn div(self, rhs: usize) -> Self::Output {
        Self(self.0 / rhs as f64)
    }
}
impl Sub for Seconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Samples per second. Always a positive integer; cannot be zero.
#[derive(Clone, Copy, Debug, Derivative, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct SampleRate(#[derivative(Default(value = "48000"))] pub usize);
#[allow(missing_docs)]
impl SampleRate {
    pub const DEFAULT_SAMPLE_RATE: usize = 48000;
    pub const DEFAULT: SampleRate = SampleRate::new(Self::DEFAULT_SAMPLE_RATE);

    pub const fn new(value: usize) -> Self {
        if value != 0 {
            Self(value)
        } else {
            Self(Self::DEFAULT_SAMPLE_RATE)
        }
    }

    /// The number of whole frames that span the given time, rounded to the
    /// nearest frame. Non-positive spans are zero frames.
    pub fn frames_for(&self, seconds: Seconds) -> usize {
        if seconds.0.is_finite() && seconds.0 > 0.0 {
            (seconds.0 * self.0 as f64).round() as usize
        } else {
            0
        }
    }

    /// The wall-clock time that the given number of frames occupies.
    pub fn seconds_for(&self, frames: usize) -> Seconds {
        Seconds(frames as f64 / self.0 as f64)
    }
}
impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{} Hz", self.0))
    }
}
impl From<usize> for SampleRate {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}
impl From<f64> for SampleRate {
    fn from(value: f64) -> Self {
        Self::new(value as usize)
    }
}
impl From<SampleRate> for f64 {
    fn from(value: SampleRate) -> Self {
        value.0 as f64
    }
}
impl From<SampleRate> for u32 {
    fn from(value: SampleRate) -> Self {
        value.0 as u32
    }
}
impl Mul<Seconds> for SampleRate {
    type Output = usize;

    fn mul(self, rhs: Seconds) -> Self::Output {
        self.frames_for(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_defaults() {
        assert_eq!(SampleRate::default().0, 48000);
        assert_eq!(SampleRate::new(0), SampleRate::DEFAULT);
    }

    #[test]
    fn frames_round_to_nearest() {
        let sr = SampleRate::new(48000);
        assert_eq!(sr.frames_for(Seconds(0.1)), 4800);
        assert_eq!(sr.frames_for(Seconds(1.0 / 48000.0 * 2.6)), 3);
        assert_eq!(sr.frames_for(Seconds(-1.0)), 0);
        assert_eq!(sr.frames_for(Seconds(f64::NAN)), 0);
        assert_eq!(sr * Seconds(4.0), 192000);
    }

    #[test]
    fn seconds_to_duration_clamps() {
        assert_eq!(Seconds(-0.5).to_duration(), Duration::ZERO);
        assert_eq!(Seconds(0.25).to_duration(), Duration::from_millis(250));
    }
}
