//! Planar orientation stored as a free angle in degrees.

use bevy::prelude::*;

/// Orientation on the XY plane. `angle_degrees` is not normalized; only the
/// derived unit vector is meaningful for comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Direction {
    pub angle_degrees: f32,
}

impl Direction {
    /// Facing +X.
    pub const RIGHT: Self = Self { angle_degrees: 0.0 };

    pub const fn from_degrees(angle_degrees: f32) -> Self {
        Self { angle_degrees }
    }

    /// Signed angle from +X to `vector`, in (-180, 180]. A zero vector maps to 0°.
    pub fn from_vector(vector: Vec2) -> Self {
        if vector == Vec2::ZERO {
            return Self::RIGHT;
        }
        Self {
            angle_degrees: vector.y.atan2(vector.x).to_degrees(),
        }
    }

    /// Unit vector: +X rotated counter-clockwise by the angle.
    pub fn vector(self) -> Vec2 {
        Vec2::from_angle(self.angle_degrees.to_radians())
    }

    pub fn rotated(self, delta_degrees: f32) -> Self {
        Self {
            angle_degrees: self.angle_degrees + delta_degrees,
        }
    }

    /// True when both angles describe the same unit vector.
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        self.vector().distance(other.vector()) <= epsilon
    }
}
