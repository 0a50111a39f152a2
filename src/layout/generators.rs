// Copyright (c) 2024 Mike Tsao

//! Procedural layouts.

use super::{Speaker, SpeakerLayout};
use crate::types::Position;
use core::f64::consts::TAU;

/// Spacing of [default_grid()], in meters.
pub const DEFAULT_GRID_SPACING: f64 = 0.04;
/// Rows (and columns) of [default_grid()].
pub const DEFAULT_GRID_SIZE: usize = 4;

/// A `size` x `size` square grid centered on `offset`. Row 0 is the top row.
/// Channels run left to right, then top to bottom.
pub fn grid(size: usize, spacing: f64, offset: Position) -> SpeakerLayout {
    let center = (size as f64 - 1.0) / 2.0;
    let speakers = (0..size)
        .flat_map(|i| (0..size).map(move |j| (i, j)))
        .map(|(i, j)| {
            let x = (j as f64 - center) * spacing + offset.x;
            let y = ((size - 1 - i) as f64 - center) * spacing + offset.y;
            Speaker::new_with(format!("G_{i:02}_{j:02}"), Position::new(x, y), i * size + j)
        })
        .collect();
    SpeakerLayout::new_with(format!("grid_{size}x{size}"), speakers)
}

/// `count` speakers evenly spaced on a circle, the first one on the +x axis,
/// proceeding counterclockwise.
pub fn circle(count: usize, radius: f64, offset: Position) -> SpeakerLayout {
    let speakers = (0..count)
        .map(|i| {
            let angle = TAU * i as f64 / count as f64;
            Speaker::new_with(
                format!("C_{i:02}"),
                Position::new(
                    radius * angle.cos() + offset.x,
                    radius * angle.sin() + offset.y,
                ),
                i,
            )
        })
        .collect();
    SpeakerLayout::new_with(format!("circle_{count}"), speakers)
}

/// `count` speakers evenly spaced along a segment of the given length,
/// centered on `offset` and rotated `angle_degrees` counterclockwise from the
/// +x axis. A single speaker sits at the offset.
pub fn line(count: usize, length: f64, angle_degrees: f64, offset: Position) -> SpeakerLayout {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let center = (count as f64 - 1.0) / 2.0;
    let speakers = (0..count)
        .map(|i| {
            let along = if count > 1 {
                (i as f64 - center) * length / (count as f64 - 1.0)
            } else {
                0.0
            };
            Speaker::new_with(
                format!("L_{i:02}"),
                Position::new(along * cos + offset.x, along * sin + offset.y),
                i,
            )
        })
        .collect();
    SpeakerLayout::new_with(format!("line_{count}"), speakers)
}

/// The layout used when nothing else is configured: a 4x4 grid at 40mm
/// spacing centered on the origin.
pub fn default_grid() -> SpeakerLayout {
    let mut layout = grid(DEFAULT_GRID_SIZE, DEFAULT_GRID_SPACING, Position::origin());
    layout.set_name("default_4x4");
    layout
}
