//! Core types and utilities for the Robaczki creature simulation.

pub mod clamp;
pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use rng::{create_rng, SimRng};
