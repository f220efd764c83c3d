//! Float-free kitchen geometry: integer-centimeter positions, squared
//! distances, and circular detection volumes.

use serde::{Deserialize, Serialize};

/// A position on the kitchen floor, in integer centimeters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub x_cm: i64,
    pub y_cm: i64,
}

impl Position {
    pub fn new(x_cm: i64, y_cm: i64) -> Self {
        Self { x_cm, y_cm }
    }

    /// Squared distance to another position. All range comparisons in the
    /// kernel use squared distances so geometry stays integer-exact.
    pub fn distance_sq(self, other: Position) -> i64 {
        let dx = self.x_cm - other.x_cm;
        let dy = self.y_cm - other.y_cm;
        dx * dx + dy * dy
    }
}

/// Circular detection volume centered on an agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectionVolume {
    pub center: Position,
    pub radius_cm: i64,
}

impl DetectionVolume {
    pub fn new(center: Position, radius_cm: i64) -> Self {
        Self { center, radius_cm }
    }

    pub fn contains(&self, point: Position) -> bool {
        self.center.distance_sq(point) <= self.radius_cm * self.radius_cm
    }
}
