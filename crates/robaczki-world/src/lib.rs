//! World simulation engine.
//!
//! This module implements the 2D plane where creatures wander, forage, sleep and die.

pub mod creature;
pub mod food;
pub mod render;
pub mod vision;
pub mod world;

pub use creature::{Creature, CreatureData, CreatureOptions, CreatureState};
pub use food::Food;
pub use render::{Canvas, DrawCommand, NullCanvas, RecordingCanvas};
pub use vision::Vision;
pub use world::{FrameReport, World, WorldSnapshot, WorldStats};
