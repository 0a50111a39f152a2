// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use more_asserts::{assert_gt, assert_le};
use spatialiser::{
    layout::{circle, default_grid, line},
    prelude::*,
};

/// A sweep of source positions covering the default grid and a margin
/// around it.
fn probe_positions() -> impl Iterator<Item = Position> {
    (-10..=10).flat_map(|i| {
        (-10..=10).map(move |j| Position::new(i as f64 * 0.01, j as f64 * 0.01))
    })
}

fn two_speakers() -> SpeakerLayout {
    SpeakerLayout::new_with(
        "pair",
        vec![
            Speaker::new_with("L", Position::new(-0.02, 0.0), 0),
            Speaker::new_with("R", Position::new(0.02, 0.0), 1),
        ],
    )
}

#[test]
fn panning_never_exceeds_unit_power() {
    let methods = [
        SpatializationMethod::from(MethodKind::TactileGrid),
        SpatializationMethod::from(MethodKind::DistancePan),
        SpatializationMethod::TactileGrid(TactileGridParams {
            falloff: TactileFalloff::Gaussian,
            ..Default::default()
        }),
    ];
    for layout in [default_grid(), circle(8, 0.05, Position::origin()), two_speakers()] {
        for method in methods.iter() {
            let engine = SpatializationEngine::new_with(layout.clone(), method.clone());
            for position in probe_positions() {
                let v = engine.compute(&position);
                assert_eq!(v.len(), layout.len());
                assert_le!(
                    v.total_power(),
                    1.0 + 1e-9,
                    "{:?} at {position:?} on {}",
                    method.kind(),
                    layout.name()
                );
            }
        }
    }
}

#[test]
fn equidistant_sources_get_equal_gains() {
    for kind in [MethodKind::TactileGrid, MethodKind::DistancePan] {
        let engine = SpatializationEngine::new_with(two_speakers(), kind.into());
        for y in [0.0, 0.01, -0.03, 0.2] {
            let v = engine.compute(&Position::new(0.0, y));
            assert!(
                approx_eq!(f64, v.gains[0], v.gains[1], ulps = 4),
                "{kind} at y={y}: {:?}",
                v.gains
            );
            assert_gt!(v.gains[0], 0.0);
        }
    }
}

#[test]
fn nearest_neighbor_picks_exactly_one() {
    let engine = SpatializationEngine::new_with(default_grid(), MethodKind::NearestNeighbor.into());
    for position in probe_positions() {
        let v = engine.compute(&position);
        let nonzero: Vec<f64> = v.gains.iter().copied().filter(|g| *g != 0.0).collect();
        assert_eq!(nonzero, vec![1.0]);
        assert!(v.delays.iter().all(|d| *d == 0.0));
    }

    let empty = SpatializationEngine::new_with(SpeakerLayout::default(), MethodKind::NearestNeighbor.into());
    assert!(empty.compute(&Position::origin()).is_empty());
}

#[test]
fn vbap_is_constant_power_over_two_speakers() {
    let engine = SpatializationEngine::new_with(circle(8, 0.05, Position::origin()), MethodKind::Vbap.into());
    for step in 0..72 {
        let angle = step as f64 * 5.0_f64.to_radians();
        let v = engine.compute(&Position::new(0.03 * angle.cos(), 0.03 * angle.sin()));
        let active: Vec<f64> = v.gains.iter().copied().filter(|g| *g > 0.0).collect();
        assert!((1..=2).contains(&active.len()), "{active:?}");
        assert!(approx_eq!(f64, v.total_power(), 1.0, epsilon = 1e-12));
    }
}

#[test]
fn every_method_handles_empty_layouts() {
    for kind in [
        MethodKind::TactileGrid,
        MethodKind::Vbap,
        MethodKind::DistancePan,
        MethodKind::NearestNeighbor,
        MethodKind::ItdIld,
    ] {
        let engine = SpatializationEngine::new_with(SpeakerLayout::default(), kind.into());
        let v = engine.compute(&Position::new(0.01, 0.01));
        assert!(v.gains.is_empty() && v.delays.is_empty(), "{kind}");
    }
}

#[test]
fn sources_on_a_speaker_stay_finite() {
    let layout = line(5, 0.2, 0.0, Position::origin());
    for kind in [
        MethodKind::TactileGrid,
        MethodKind::Vbap,
        MethodKind::DistancePan,
        MethodKind::NearestNeighbor,
        MethodKind::ItdIld,
    ] {
        let engine = SpatializationEngine::new_with(layout.clone(), kind.into());
        for speaker in layout.speakers() {
            let v = engine.compute(&speaker.position);
            assert!(
                v.gains.iter().chain(v.delays.iter()).all(|x| x.is_finite()),
                "{kind} at {}",
                speaker.id
            );
        }
    }
}

#[test]
fn trajectories_hit_their_control_points() {
    let p0 = Position::new(-0.04, -0.02);
    let pm = Position::new(0.0, 0.08);
    let p1 = Position::new(0.06, 0.01);

    let linear = Trajectory::from_points(&[p0, p1], PathMode::Straight).unwrap();
    assert_eq!(linear.position_at(0.0), p0);
    assert_eq!(linear.position_at(1.0), p1);

    let curved = Trajectory::from_points(&[p0, pm, p1], PathMode::Curved).unwrap();
    let expected = Position::new(
        0.25 * p0.x + 0.5 * pm.x + 0.25 * p1.x,
        0.25 * p0.y + 0.5 * pm.y + 0.25 * p1.y,
    );
    let mid = curved.position_at(0.5);
    assert!(approx_eq!(f64, mid.x, expected.x, epsilon = 1e-12));
    assert!(approx_eq!(f64, mid.y, expected.y, epsilon = 1e-12));

    // Without MODE=CURVED, the middle point is ignored.
    let straight = Trajectory::from_points(&[p0, pm, p1], PathMode::Straight).unwrap();
    assert_eq!(straight, linear);
}
