use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// A simple 2D vector struct in grid units.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2.
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Calculates the squared distance to another vector (point).
    /// Plain Euclidean distance: no toroidal shortest path.
    pub fn distance_squared(&self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self { x: self.x * scalar, y: self.y * scalar }
    }
}

/// Converts an angle (in radians) to a unit vector.
pub fn angle_to_vec(angle_rad: f32) -> Vec2 {
    Vec2::new(angle_rad.cos(), angle_rad.sin())
}

/// Wraps a continuous coordinate into `[0, size)`.
///
/// `rem_euclid` can round a tiny negative input up to exactly `size`; that case folds back to 0.
/// Non-finite input maps to 0 so it can never reach an index computation.
pub fn wrap_coord(value: f32, size: f32) -> f32 {
    if !value.is_finite() || size <= 0.0 {
        return 0.0;
    }
    let wrapped = value.rem_euclid(size);
    if wrapped >= size { 0.0 } else { wrapped }
}
