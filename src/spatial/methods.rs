// Copyright (c) 2024 Mike Tsao

//! The gain/delay algorithms. Each is a pure function of the speaker
//! positions and the source position.

use super::{DistancePanParams, GainDelayVector, ItdIldParams, TactileFalloff, TactileGridParams};
use crate::types::{Position, PositionExt};
use core::f64::consts::{PI, TAU};

/// Floor applied to distances wherever one ends up in a denominator, in
/// meters.
pub(crate) const DISTANCE_FLOOR: f64 = 0.001;

/// Weights at or below this are treated as inactive.
pub(crate) const ACTIVE_GAIN_THRESHOLD: f64 = 0.001;

fn distances(speakers: &[Position], source: &Position) -> Vec<f64> {
    speakers.iter().map(|s| source.distance_to(s)).collect()
}

/// Speaker indices ordered by ascending `keys`. The sort is stable, so ties
/// keep layout order.
fn ascending_order(keys: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|a, b| keys[*a].total_cmp(&keys[*b]));
    order
}

/// Scales gains so the sum of their squares is 1.0. All-zero input stays
/// all-zero.
fn power_normalize(gains: &mut [f64]) {
    let total_power: f64 = gains.iter().map(|g| g * g).sum();
    if total_power > 0.0 {
        let scale = total_power.sqrt().recip();
        gains.iter_mut().for_each(|g| *g *= scale);
    }
}

pub(crate) fn nearest_neighbor(speakers: &[Position], source: &Position) -> GainDelayVector {
    let mut result = GainDelayVector::new_silent(speakers.len());
    let mut nearest: Option<(usize, f64)> = None;
    for (i, d) in distances(speakers, source).into_iter().enumerate() {
        match nearest {
            Some((_, best)) if d >= best => {}
            _ => nearest = Some((i, d)),
        }
    }
    if let Some((i, _)) = nearest {
        result.gains[i] = 1.0;
    }
    result
}

pub(crate) fn distance_pan(
    speakers: &[Position],
    source: &Position,
    params: &DistancePanParams,
) -> GainDelayVector {
    let mut result = GainDelayVector::new_silent(speakers.len());
    for (gain, d) in result
        .gains
        .iter_mut()
        .zip(distances(speakers, source).into_iter())
    {
        *gain = d.max(DISTANCE_FLOOR).powf(params.rolloff).recip();
    }
    power_normalize(&mut result.gains);
    result
}

pub(crate) fn vbap(speakers: &[Position], source: &Position) -> GainDelayVector {
    let mut result = GainDelayVector::new_silent(speakers.len());
    if speakers.is_empty() {
        return result;
    }

    let source_angle = source.polar_angle();
    let angles: Vec<f64> = speakers.iter().map(|s| s.polar_angle()).collect();
    let angular_distances: Vec<f64> = angles
        .iter()
        .map(|a| {
            let d = (a - source_angle).abs();
            d.min(TAU - d)
        })
        .collect();
    let order = ascending_order(&angular_distances);
    let first = order[0];
    let second = order.get(1).copied().unwrap_or(first);

    // Measure both the speaker pair and the source along the shorter arc
    // starting at the nearest speaker, so pairs that straddle angle zero
    // interpolate correctly.
    let pair_arc = signed_arc(angles[first], angles[second]);
    if first == second || pair_arc == 0.0 {
        result.gains[first] = 1.0;
        return result;
    }
    let t = (signed_arc(angles[first], source_angle) / pair_arc).clamp(0.0, 1.0);
    result.gains[first] = (1.0 - t).sqrt();
    result.gains[second] = t.sqrt();
    result
}

/// The signed angle from `from` to `to` along the shorter arc, in (-π, π].
fn signed_arc(from: f64, to: f64) -> f64 {
    let mut d = (to - from).rem_euclid(TAU);
    if d > PI {
        d -= TAU;
    }
    d
}

pub(crate) fn tactile_grid(
    speakers: &[Position],
    source: &Position,
    params: &TactileGridParams,
) -> GainDelayVector {
    let mut result = GainDelayVector::new_silent(speakers.len());
    let distances = distances(speakers, source);

    match params.falloff {
        TactileFalloff::Gaussian => {
            let sigma = params.gaussian_sigma.max(f64::EPSILON);
            let two_sigma_squared = 2.0 * sigma * sigma;
            for (gain, d) in result.gains.iter_mut().zip(distances.iter()) {
                *gain = (-(d * d) / two_sigma_squared).exp();
            }
            power_normalize(&mut result.gains);
        }
        TactileFalloff::InverseDistance => {
            let order = ascending_order(&distances);
            let nearest = &order[..params.max_active_speakers.min(order.len())];

            let mut total_weight = 0.0;
            for &i in nearest {
                let weight = (distances[i] + params.smooth_min_distance)
                    .max(DISTANCE_FLOOR)
                    .powf(params.distance_power)
                    .recip();
                result.gains[i] = weight;
                total_weight += weight;
            }
            if total_weight > 0.0 {
                for &i in nearest {
                    result.gains[i] /= total_weight;
                }
            }

            for gain in result.gains.iter_mut() {
                if *gain > ACTIVE_GAIN_THRESHOLD {
                    *gain *= params.enhancement;
                }
            }

            // Only ever scale down, so quiet positions stay quiet.
            let total_power: f64 = result.gains.iter().map(|g| g * g).sum();
            if total_power > 1.0 {
                power_normalize(&mut result.gains);
            }
        }
    }
    result
}

pub(crate) fn itd_ild(
    speakers: &[Position],
    source: &Position,
    params: &ItdIldParams,
) -> GainDelayVector {
    let mut result = GainDelayVector::new_silent(speakers.len());
    match speakers.len() {
        0 => return result,
        1 => {
            result.gains[0] = 1.0;
            return result;
        }
        _ => {}
    }

    let distances = distances(speakers, source);
    let speed_of_sound = params.speed_of_sound.max(f64::EPSILON);

    // The time difference only ever involves the first two transducers.
    for (i, other) in [(0, 1), (1, 0)] {
        result.delays[i] =
            (distances[i] - distances[other]) / speed_of_sound * params.itd_exaggeration;
    }

    if speakers.len() == 2 {
        for (i, other) in [(0, 1), (1, 0)] {
            result.gains[i] = if distances[i] <= distances[other] {
                1.0
            } else {
                (distances[other] / distances[i]).powf(params.ild_exponent)
            };
        }
    } else {
        for (gain, d) in result.gains.iter_mut().zip(distances.iter()) {
            *gain = (d + DISTANCE_FLOOR).recip();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn signed_arc_wraps() {
        assert!(approx_eq!(f64, signed_arc(0.1, 0.3), 0.2, epsilon = 1e-12));
        assert!(approx_eq!(
            f64,
            signed_arc(0.1, TAU - 0.1),
            -0.2,
            epsilon = 1e-12
        ));
        assert!(approx_eq!(
            f64,
            signed_arc(TAU - 0.1, 0.1),
            0.2,
            epsilon = 1e-12
        ));
    }

    #[test]
    fn ascending_order_is_stable() {
        assert_eq!(ascending_order(&[2.0, 1.0, 1.0, 0.5]), vec![3, 1, 2, 0]);
    }

    #[test]
    fn power_normalize_leaves_silence_alone() {
        let mut gains = [0.0, 0.0];
        power_normalize(&mut gains);
        assert_eq!(gains, [0.0, 0.0]);

        let mut gains = [3.0, 4.0];
        power_normalize(&mut gains);
        assert!(approx_eq!(f64, gains[0], 0.6, epsilon = 1e-12));
        assert!(approx_eq!(f64, gains[1], 0.8, epsilon = 1e-12));
    }
}
