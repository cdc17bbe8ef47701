//! Clamping and default-substitution helpers.
//!
//! Simulation state never signals failure; out-of-range values are pulled back into range
//! here, in one place, so the rules can be tested on their own.

/// Clamp a resource value into `[0, max]`. NaN collapses to 0.
pub fn clamp_resource(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max.max(0.0))
}

/// Positive, finite `value` or `fallback`.
pub fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Non-zero `value` or `fallback`.
pub fn positive_or_u32(value: u32, fallback: u32) -> u32 {
    if value > 0 {
        value
    } else {
        fallback
    }
}

/// Resolve an optional positive quantity, falling back when absent or unusable.
pub fn resolve_positive(value: Option<f64>, fallback: f64) -> f64 {
    value.map_or(fallback, |v| positive_or(v, fallback))
}

/// Resolve an optional finite quantity, falling back when absent or non-finite.
pub fn resolve_finite(value: Option<f64>, fallback: impl FnOnce() -> f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => fallback(),
    }
}
