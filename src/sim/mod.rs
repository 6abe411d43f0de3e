//! Deterministic simulation module
//!
//! Ball movement and collision live here. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (obstacle registration order)
//! - No rendering or platform dependencies

pub mod ball;
pub mod paddle;
pub mod response;
pub mod simulator;
pub mod world;

pub use ball::{Ball, BallId, BallState, ResetRequest};
pub use paddle::{AbsoluteInput, AxisInput, MoveSource, Paddle, PaddleCommand, TrackingAi};
pub use response::{
    axis_angle_limit, block_response, impact_offset, paddle_fake_normal, paddle_response,
    speed_limit, wall_response,
};
pub use simulator::{BallSimulator, BlockDamage, DamageOutcome, NoBlocks, SimEvent};
pub use world::{
    CollisionMask, CollisionWorld, HitResult, Obstacle, ObstacleId, ObstacleKind, Side,
};
