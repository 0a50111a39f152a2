// Copyright (c) 2024 Mike Tsao

//! Positions in the plane of the transducer array, in meters.

use core::f64::consts::TAU;
use nalgebra::Point2;

/// A point in the plane of the array. +x is right, +y is up, units are meters.
pub type Position = Point2<f64>;

/// Geometry helpers that the spatialization methods need.
pub trait PositionExt {
    /// Euclidean distance to another point.
    fn distance_to(&self, other: &Position) -> f64;

    /// The angle of this point around the origin, normalized to [0, 2π).
    fn polar_angle(&self) -> f64;

    /// Linear interpolation from `self` (t = 0) to `other` (t = 1).
    fn lerp_to(&self, other: &Position, t: f64) -> Position;
}
impl PositionExt for Position {
    fn distance_to(&self, other: &Position) -> f64 {
        nalgebra::distance(self, other)
    }

    fn polar_angle(&self) -> f64 {
        let angle = self.y.atan2(self.x);
        if angle < 0.0 {
            angle + TAU
        } else {
            angle
        }
    }

    fn lerp_to(&self, other: &Position, t: f64) -> Position {
        Position::from(self.coords * (1.0 - t) + other.coords * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{FRAC_PI_2, PI};
    use float_cmp::approx_eq;

    #[test]
    fn polar_angle_is_normalized() {
        assert_eq!(Position::new(1.0, 0.0).polar_angle(), 0.0);
        assert!(approx_eq!(
            f64,
            Position::new(0.0, 1.0).polar_angle(),
            FRAC_PI_2,
            ulps = 2
        ));
        assert!(approx_eq!(
            f64,
            Position::new(-1.0, 0.0).polar_angle(),
            PI,
            ulps = 2
        ));
        assert!(approx_eq!(
            f64,
            Position::new(0.0, -1.0).polar_angle(),
            3.0 * FRAC_PI_2,
            ulps = 2
        ));

        // atan2(0, 0) is zero, so a speaker at the origin sits at angle zero.
        assert_eq!(Position::origin().polar_angle(), 0.0);
    }

    #[test]
    fn distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(0.03, 0.04);
        assert!(approx_eq!(f64, a.distance_to(&b), 0.05, epsilon = 1e-12));
    }
}
