//! Vision-cone perception.

use crate::food::Food;
use robaczki_core::{normalize_angle, Position};
use serde::{Deserialize, Serialize};

/// Slack on the angular edges so a target placed exactly on the boundary survives trig rounding.
const EDGE_EPSILON: f64 = 1e-9;

/// Angular and radial extent of what a creature can see
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vision {
    /// Full opening of the cone, in degrees
    pub angle: f64,
    /// Maximum seeing distance
    pub range: f64,
}

impl Vision {
    pub fn new(angle: f64, range: f64) -> Self {
        Self { angle, range }
    }

    /// Half the opening, in radians
    pub fn half_angle(&self) -> f64 {
        self.angle.to_radians() / 2.0
    }

    /// Whether `target` lies inside the cone of a viewer at `origin` facing `heading`.
    ///
    /// Inclusive on both the range and the angular boundary.
    pub fn contains(&self, origin: Position, heading: f64, target: Position) -> bool {
        let distance = origin.distance(&target);
        if distance > self.range {
            return false;
        }
        if distance == 0.0 {
            return true;
        }

        let offset = normalize_angle(origin.bearing_to(&target) - heading);
        offset.abs() <= self.half_angle() + EDGE_EPSILON
    }

    /// Nearest visible food by Euclidean distance. Linear scan; ties keep the earlier item.
    pub fn nearest<'a>(&self, origin: Position, heading: f64, foods: &'a [Food]) -> Option<&'a Food> {
        foods
            .iter()
            .filter(|food| self.contains(origin, heading, food.position))
            .map(|food| (origin.distance(&food.position), food))
            .fold(None, |best: Option<(f64, &Food)>, (dist, food)| match best {
                Some((best_dist, _)) if best_dist <= dist => best,
                _ => Some((dist, food)),
            })
            .map(|(_, food)| food)
    }
}
