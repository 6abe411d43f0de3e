//! Ricochet - ball simulation core for Pong and Breakout
//!
//! Core modules:
//! - `sim`: Deterministic ball sweep, collision world and collision response
//! - `game`: Score, lives and stage bookkeeping driven by simulation events
//! - `settings`: Per-variant tunables loaded from JSON
//! - `error`: Settings validation errors

pub mod error;
pub mod game;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{BreakoutSettings, GameStage, PongSettings, SimulationParameters, TravelAxis};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz physics rate)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Sweep distance is the tick's nominal travel times this factor
    pub const OVERSHOOT_FACTOR: f32 = 1.5;
    /// Maximum impacts resolved in a single tick
    pub const MAX_IMPACTS_PER_TICK: u32 = 8;
    /// Lengths and divisors below this are treated as zero
    pub const EPSILON: f32 = 1.0e-6;
    /// Hits closer together than this along a ray count as simultaneous
    pub const TIE_DISTANCE: f32 = 1.0e-5;
    /// Largest block grid a Breakout layout may generate
    pub const MAX_BLOCKS: usize = 4096;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Reflect a vector off a surface
///
/// Standard reflection: v' = v - 2(v·n)n, with `normal` of unit length.
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Rotate a vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Signed angle (radians, counter-clockwise positive) from `from` to `to`
///
/// Returns 0 when either vector is zero.
#[inline]
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    from.perp_dot(to).atan2(from.dot(to))
}

/// Scale `v` down so its length does not exceed `max`
#[inline]
pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    if v.length() > max {
        v.normalize_or_zero() * max
    } else {
        v
    }
}

/// Remove the component of `v` along `normal`
pub fn project_onto_plane(v: Vec2, normal: Vec2) -> Vec2 {
    let n = normal.normalize_or_zero();
    v - n * v.dot(n)
}

/// Rotate `v` toward `reference` until the angle between them is at most `max_angle`
///
/// Length is preserved. Vectors already inside the cone are returned unchanged.
pub fn limit_angle(v: Vec2, reference: Vec2, max_angle: f32) -> Vec2 {
    let angle = signed_angle(reference, v);
    if angle.abs() <= max_angle {
        return v;
    }
    let excess = angle - max_angle.copysign(angle);
    rotate(v, -excess)
}
