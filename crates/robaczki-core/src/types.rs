//! Core type definitions for the simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;

/// Unique identifier for a food item within one world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FoodId(pub u64);

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "food-{}", self.0)
    }
}

/// Unique identifier for a creature within one world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(pub u64);

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "creature-{}", self.0)
    }
}

/// Continuous 2D position on the plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance to another position
    pub fn distance(&self, other: &Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Bearing (radians) from this position towards `other`
    pub fn bearing_to(&self, other: &Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Apply toroidal wrapping for the given bounds
    pub fn wrap(&self, bounds: Bounds) -> Self {
        Self {
            x: wrap_axis(self.x, bounds.width),
            y: wrap_axis(self.y, bounds.height),
        }
    }

    /// Uniformly random position inside the bounds
    pub fn random_within<R: Rng + ?Sized>(bounds: Bounds, rng: &mut R) -> Self {
        Self {
            x: rng.gen::<f64>() * bounds.width,
            y: rng.gen::<f64>() * bounds.height,
        }
    }
}

fn wrap_axis(value: f64, extent: f64) -> f64 {
    if extent <= 0.0 || !value.is_finite() {
        return value;
    }
    if (0.0..=extent).contains(&value) {
        return value;
    }
    value.rem_euclid(extent)
}

/// Size of the plane creatures live on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, pos: &Position) -> bool {
        (0.0..=self.width).contains(&pos.x) && (0.0..=self.height).contains(&pos.y)
    }
}

/// Normalize an angle into [-PI, PI]
pub fn normalize_angle(angle: f64) -> f64 {
    if (-PI..=PI).contains(&angle) {
        return angle;
    }
    (angle + PI).rem_euclid(TAU) - PI
}

/// RGBA color handed to the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Random opaque color
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let packed: u32 = rng.gen_range(0..=0xFF_FFFF);
        Self::rgb((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
