//! Configuration types for the simulation.
//!
//! Every struct carries `#[serde(default)]`, so a partial JSON file only overrides the keys
//! it names. Loaded values are never rejected: [`SimConfig::sanitized`] replaces anything
//! unusable with the default for that field.

use crate::clamp::{positive_or, positive_or_u32};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;
use tracing::warn;

/// Upper bound on the host frame rate
pub const MAX_FRAMES_PER_SECOND: u32 = 1000;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the plane before the host fits it to a surface
    pub width: f64,
    /// Height of the plane before the host fits it to a surface
    pub height: f64,
    /// Creatures placed when the world starts
    pub initial_creatures: usize,
    /// Wholesome food placed when the world starts
    pub initial_food: usize,
    /// Frames between two food spawns
    pub food_spawn_interval: u32,
    /// Every n-th spawned food is poisonous
    pub poison_every: u64,
    /// Nutrition of wholesome food
    pub food_nutrition: f64,
    /// Nutrition of poisonous food
    pub poison_nutrition: f64,
    /// Radius used when drawing food
    pub food_radius: f64,
    /// Frames between two population metric reports
    pub metrics_interval: u64,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            initial_creatures: 1,
            initial_food: 5,
            food_spawn_interval: 30 * 60, // 30 seconds at 60 fps
            poison_every: 5,
            food_nutrition: 15.0,
            poison_nutrition: -10.0,
            food_radius: 4.0,
            metrics_interval: 600,
            seed: 0,
        }
    }
}

/// Default traits for newly created creatures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    pub max_speed: f64,
    pub max_energy: f64,
    pub max_health: f64,
    /// Vision range in world units
    pub view_range: f64,
    /// Lower bound (degrees) of the randomized vision angle
    pub min_view_angle: f64,
    /// Upper bound (degrees) of the randomized vision angle
    pub max_view_angle: f64,
    /// Frames spent eating one food item
    pub eating_duration: u32,
    /// Frames spent asleep after running out of energy
    pub sleep_duration: u32,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            max_energy: 100.0,
            max_health: 10.0,
            view_range: 150.0,
            min_view_angle: 45.0,
            max_view_angle: 180.0,
            eating_duration: 3 * 60,
            sleep_duration: 5 * 60,
        }
    }
}

/// Tuning constants shared by every creature's update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Distance below which a hunting creature starts eating
    pub arrival_threshold: f64,
    /// Fraction of max speed used while hunting
    pub hunt_speed_factor: f64,
    /// Per-tick probability of a random heading change while wandering
    pub wander_turn_chance: f64,
    /// Largest heading change (radians, either way) while wandering
    pub wander_turn_max: f64,
    pub wander_min_speed: f64,
    pub wander_max_speed: f64,
    /// Energy lost per unit of speed per tick
    pub energy_drain_rate: f64,
    /// Energy lost on finishing a poisonous meal
    pub poison_energy_penalty: f64,
    /// Speed multiplier of a fully depleted creature
    pub fatigue_floor: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: 15.0,
            hunt_speed_factor: 0.8,
            wander_turn_chance: 0.03,
            wander_turn_max: std::f64::consts::FRAC_PI_4,
            wander_min_speed: 0.5,
            wander_max_speed: 2.0,
            energy_drain_rate: 0.02,
            poison_energy_penalty: 20.0,
            fatigue_floor: 0.3,
        }
    }
}

/// Render surface and frame pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub max_width: f64,
    pub max_height: f64,
    /// Horizontal space reserved around the surface
    pub margin_x: f64,
    /// Vertical space reserved for the page chrome
    pub margin_y: f64,
    pub frames_per_second: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_width: 800.0,
            max_height: 600.0,
            margin_x: 40.0,
            margin_y: 120.0,
            frames_per_second: 60,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub creature: CreatureConfig,
    pub behavior: BehaviorConfig,
    pub host: HostConfig,
}

impl SimConfig {
    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Replace every unusable value with its default.
    pub fn sanitized(self) -> Self {
        let defaults = SimConfig::default();
        let SimConfig {
            world,
            creature,
            behavior,
            host,
        } = self;

        let world = WorldConfig {
            width: positive_or(world.width, defaults.world.width),
            height: positive_or(world.height, defaults.world.height),
            food_spawn_interval: positive_or_u32(
                world.food_spawn_interval,
                defaults.world.food_spawn_interval,
            ),
            poison_every: if world.poison_every == 0 {
                defaults.world.poison_every
            } else {
                world.poison_every
            },
            food_nutrition: finite_or(world.food_nutrition, defaults.world.food_nutrition),
            poison_nutrition: finite_or(world.poison_nutrition, defaults.world.poison_nutrition),
            food_radius: positive_or(world.food_radius, defaults.world.food_radius),
            metrics_interval: world.metrics_interval.max(1),
            ..world
        };

        let mut creature = CreatureConfig {
            max_speed: positive_or(creature.max_speed, defaults.creature.max_speed),
            max_energy: positive_or(creature.max_energy, defaults.creature.max_energy),
            max_health: positive_or(creature.max_health, defaults.creature.max_health),
            view_range: positive_or(creature.view_range, defaults.creature.view_range),
            min_view_angle: positive_or(creature.min_view_angle, defaults.creature.min_view_angle)
                .min(360.0),
            max_view_angle: positive_or(creature.max_view_angle, defaults.creature.max_view_angle)
                .min(360.0),
            eating_duration: positive_or_u32(
                creature.eating_duration,
                defaults.creature.eating_duration,
            ),
            sleep_duration: positive_or_u32(
                creature.sleep_duration,
                defaults.creature.sleep_duration,
            ),
        };
        if creature.min_view_angle > creature.max_view_angle {
            warn!(
                min = creature.min_view_angle,
                max = creature.max_view_angle,
                "View angle bounds inverted, swapping"
            );
            std::mem::swap(&mut creature.min_view_angle, &mut creature.max_view_angle);
        }

        let mut behavior = BehaviorConfig {
            arrival_threshold: positive_or(
                behavior.arrival_threshold,
                defaults.behavior.arrival_threshold,
            ),
            hunt_speed_factor: unit_or(behavior.hunt_speed_factor, defaults.behavior.hunt_speed_factor),
            wander_turn_chance: unit_or(
                behavior.wander_turn_chance,
                defaults.behavior.wander_turn_chance,
            ),
            wander_turn_max: finite_or(behavior.wander_turn_max, defaults.behavior.wander_turn_max)
                .abs()
                .min(PI),
            wander_min_speed: positive_or(
                behavior.wander_min_speed,
                defaults.behavior.wander_min_speed,
            ),
            wander_max_speed: positive_or(
                behavior.wander_max_speed,
                defaults.behavior.wander_max_speed,
            ),
            energy_drain_rate: finite_or(
                behavior.energy_drain_rate,
                defaults.behavior.energy_drain_rate,
            )
            .max(0.0),
            poison_energy_penalty: finite_or(
                behavior.poison_energy_penalty,
                defaults.behavior.poison_energy_penalty,
            )
            .max(0.0),
            fatigue_floor: unit_or(behavior.fatigue_floor, defaults.behavior.fatigue_floor),
        };
        if behavior.wander_min_speed >= behavior.wander_max_speed {
            behavior.wander_min_speed = defaults.behavior.wander_min_speed;
            behavior.wander_max_speed = defaults.behavior.wander_max_speed;
        }

        let host = HostConfig {
            max_width: positive_or(host.max_width, defaults.host.max_width),
            max_height: positive_or(host.max_height, defaults.host.max_height),
            margin_x: finite_or(host.margin_x, defaults.host.margin_x).max(0.0),
            margin_y: finite_or(host.margin_y, defaults.host.margin_y).max(0.0),
            frames_per_second: positive_or_u32(
                host.frames_per_second,
                defaults.host.frames_per_second,
            )
            .min(MAX_FRAMES_PER_SECOND),
        };

        Self {
            world,
            creature,
            behavior,
            host,
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn unit_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        value
    } else {
        fallback
    }
}
