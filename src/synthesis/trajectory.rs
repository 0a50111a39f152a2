// Copyright (c) 2024 Mike Tsao

use crate::types::{Position, PositionExt};
use core::f64::consts::TAU;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

/// How a three-point path uses its middle point.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumString,
    IntoStaticStr,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PathMode {
    /// Ignore the middle point and go straight from first to last.
    #[default]
    Straight,
    /// Bend toward the middle point along a quadratic Bézier curve.
    Curved,
}

/// A path through the plane, parameterized by normalized time in [0, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Trajectory {
    #[allow(missing_docs)]
    Linear { start: Position, end: Position },
    #[allow(missing_docs)]
    Quadratic {
        start: Position,
        control: Position,
        end: Position,
    },
}
impl Trajectory {
    /// Builds a path from two or three control points. Extra points beyond
    /// the third are ignored. Returns None with fewer than two points.
    pub fn from_points(points: &[Position], mode: PathMode) -> Option<Self> {
        match (points, mode) {
            ([start, end], _) => Some(Self::Linear {
                start: *start,
                end: *end,
            }),
            ([start, control, end, ..], PathMode::Curved) => Some(Self::Quadratic {
                start: *start,
                control: *control,
                end: *end,
            }),
            ([start, _, end, ..], PathMode::Straight) => Some(Self::Linear {
                start: *start,
                end: *end,
            }),
            _ => None,
        }
    }

    /// A path that doesn't move.
    pub fn stationary(position: Position) -> Self {
        Self::Linear {
            start: position,
            end: position,
        }
    }

    #[allow(missing_docs)]
    pub fn start(&self) -> Position {
        match self {
            Self::Linear { start, .. } | Self::Quadratic { start, .. } => *start,
        }
    }

    #[allow(missing_docs)]
    pub fn end(&self) -> Position {
        match self {
            Self::Linear { end, .. } | Self::Quadratic { end, .. } => *end,
        }
    }

    /// The position at normalized time `t`. The endpoints are returned
    /// exactly at t = 0 and t = 1; values outside that range clamp.
    pub fn position_at(&self, t: f64) -> Position {
        if t.is_nan() || t <= 0.0 {
            return self.start();
        }
        if t >= 1.0 {
            return self.end();
        }
        match self {
            Self::Linear { start, end } => start.lerp_to(end, t),
            Self::Quadratic {
                start,
                control,
                end,
            } => {
                let u = 1.0 - t;
                Position::from(
                    start.coords * (u * u) + control.coords * (2.0 * u * t) + end.coords * (t * t),
                )
            }
        }
    }
}

/// Normalized time of step `index` out of `steps`: 0 for the first step and
/// 1 for the last. A single step sits at 0.
pub fn step_fraction(index: usize, steps: usize) -> f64 {
    if steps <= 1 {
        0.0
    } else {
        index as f64 / (steps - 1) as f64
    }
}

/// A point on a circle around the origin at normalized time `t`. The path
/// starts at +y and runs clockwise, one revolution per unit of `t`.
pub fn circle_position(radius: f64, t: f64) -> Position {
    let (sin, cos) = (TAU * t).sin_cos();
    Position::new(radius * sin, radius * cos)
}
