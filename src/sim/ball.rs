//! Ball state
//!
//! The ball is owned exclusively by `BallSimulator` and re-initialized by resets
//! rather than destroyed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::{CollisionMask, Side};

pub type BallId = u32;

/// Reset lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BallState {
    /// Visible and moving
    Active,
    /// Hidden after a goal; movement and collision are suspended until the
    /// countdown (seconds) reaches zero
    ResettingHidden { remaining: f32 },
}

/// Request to re-serve the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetRequest {
    /// Side that lost the point; the serve heads toward it
    pub losing_side: Side,
    /// Serve immediately instead of waiting out `reset_wait`
    pub skip_wait: bool,
}

impl ResetRequest {
    pub fn new(losing_side: Side) -> Self {
        Self {
            losing_side,
            skip_wait: false,
        }
    }

    pub fn immediate(losing_side: Side) -> Self {
        Self {
            losing_side,
            skip_wait: true,
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Speed the velocity is renormalized to each tick
    pub speed: f32,
    /// Obstacle categories the ball collides with
    pub mask: CollisionMask,
    pub state: BallState,
    /// Cleared by a block hit, set again by a paddle or wall hit
    pub block_collision_armed: bool,
}

impl Ball {
    pub fn new(id: BallId, radius: f32) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius,
            speed: 0.0,
            mask: CollisionMask::ALL,
            state: BallState::Active,
            block_collision_armed: true,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.state, BallState::Active)
    }

    /// Hidden balls are not drawn and ignore collisions
    #[inline]
    pub fn is_hidden(&self) -> bool {
        matches!(self.state, BallState::ResettingHidden { .. })
    }

    /// Categories to sweep against this tick
    pub fn effective_mask(&self) -> CollisionMask {
        if self.block_collision_armed {
            self.mask
        } else {
            self.mask.without(CollisionMask::BLOCKS)
        }
    }
}
