//! Rules layer
//!
//! Owns arena geometry, paddles and scoring for each game variant. Every tick
//! it snapshots obstacle geometry into a `CollisionWorld`, advances the ball
//! simulator, then reacts to the returned events.

pub mod breakout;
pub mod pong;

pub use breakout::{Block, BlockField, BreakoutRun};
pub use pong::PongMatch;

use glam::Vec2;

use crate::sim::{Obstacle, ObstacleId, ObstacleKind};

/// Thickness of arena walls and goal triggers
pub const WALL_THICKNESS: f32 = 1.0;

/// Obstacle id allocator
///
/// Ids are never reused, so a block regenerated on restart can't be confused
/// with one from the previous run.
#[derive(Debug, Clone)]
pub struct EntityIds {
    next_id: ObstacleId,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl EntityIds {
    pub fn next_entity_id(&mut self) -> ObstacleId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Allocate an id and build an axis-aligned obstacle with it
    pub fn obstacle(&mut self, kind: ObstacleKind, center: Vec2, size: Vec2) -> Obstacle {
        Obstacle::new(self.next_entity_id(), kind, center, size)
    }
}
