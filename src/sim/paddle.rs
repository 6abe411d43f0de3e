//! Paddles and the sources that steer them
//!
//! A paddle slides along a straight lane between two bounds. Each tick a
//! `MoveSource` (player input or AI) produces a `PaddleCommand`, and the paddle
//! converts it into a clamped lane velocity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::world::{Obstacle, ObstacleId, ObstacleKind};
use crate::consts::EPSILON;
use crate::rotate;

/// Proportional gain for absolute (pointer/stick) input: effectively full speed
pub const ABSOLUTE_INPUT_GAIN: f32 = 10.0;
/// Proportional gain for the tracking AI
pub const TRACKING_AI_GAIN: f32 = 2.0;

/// Movement request for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PaddleCommand {
    /// Signed fraction of max speed, clamped to [-1, 1]
    Velocity(f32),
    /// Proportional move toward a lane coordinate
    Seek { target: f32, gain: f32 },
    Hold,
}

/// A paddle obstacle that moves along a lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub id: ObstacleId,
    pub pos: Vec2,
    /// Extent of the hitting face
    pub length: f32,
    pub thickness: f32,
    /// Rotation of the face normal from +y (radians, counter-clockwise)
    pub rotation: f32,
    /// Unit direction the paddle slides along
    pub lane_axis: Vec2,
    pub lane_min: f32,
    pub lane_max: f32,
    pub max_speed: f32,
    /// Lane velocity applied by the last step
    pub velocity: f32,
}

impl Paddle {
    /// Paddle centred in its lane, facing `face` (unit, into the arena)
    pub fn new(id: ObstacleId, pos: Vec2, face: Vec2, length: f32, thickness: f32) -> Self {
        let face = face.normalize_or_zero();
        let rotation = Vec2::Y.angle_to(face);
        let lane_axis = rotate(Vec2::X, rotation);
        let lane = pos.dot(lane_axis);
        Self {
            id,
            pos,
            length,
            thickness,
            rotation,
            lane_axis,
            lane_min: lane,
            lane_max: lane,
            max_speed: 0.0,
            velocity: 0.0,
        }
    }

    /// Set the lane the paddle slides along and its speed limit
    ///
    /// Bounds are coordinates along `axis` and clamp the paddle centre.
    pub fn with_lane(mut self, axis: Vec2, min: f32, max: f32, max_speed: f32) -> Self {
        self.lane_axis = axis.normalize_or_zero();
        self.lane_min = min.min(max);
        self.lane_max = max.max(min);
        self.max_speed = max_speed;
        self
    }

    /// Coordinate along the lane axis
    #[inline]
    pub fn lane_position(&self) -> f32 {
        self.pos.dot(self.lane_axis)
    }

    #[inline]
    pub fn lane_center(&self) -> f32 {
        (self.lane_min + self.lane_max) * 0.5
    }

    /// Outward face normal
    #[inline]
    pub fn face(&self) -> Vec2 {
        rotate(Vec2::Y, self.rotation)
    }

    /// Collision geometry for this tick's world snapshot
    pub fn obstacle(&self) -> Obstacle {
        Obstacle::new(
            self.id,
            ObstacleKind::Paddle,
            self.pos,
            Vec2::new(self.length, self.thickness),
        )
        .with_rotation(self.rotation)
    }

    fn set_lane_position(&mut self, lane: f32) {
        let lane = lane.clamp(self.lane_min, self.lane_max);
        self.pos += self.lane_axis * (lane - self.lane_position());
    }

    /// Apply a command for one timestep
    pub fn step(&mut self, command: PaddleCommand, dt: f32) {
        let velocity = match command {
            PaddleCommand::Velocity(signal) => signal.clamp(-1.0, 1.0) * self.max_speed,
            PaddleCommand::Seek { target, gain } => {
                ((target - self.lane_position()) * gain).clamp(-self.max_speed, self.max_speed)
            }
            PaddleCommand::Hold => 0.0,
        };
        let velocity = if velocity.is_finite() { velocity } else { 0.0 };

        let before = self.lane_position();
        self.set_lane_position(before + velocity * dt);
        self.velocity = if dt > 0.0 {
            (self.lane_position() - before) / dt
        } else {
            0.0
        };
    }

    pub fn reset_to_center(&mut self) {
        self.set_lane_position(self.lane_center());
        self.velocity = 0.0;
    }
}

/// Anything that can steer a paddle
pub trait MoveSource {
    fn command(&mut self, paddle: &Paddle, ball: &Ball) -> PaddleCommand;
}

/// Relative input (keys or stick axis): signal is a fraction of max speed
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisInput {
    pub signal: f32,
}

impl MoveSource for AxisInput {
    fn command(&mut self, _paddle: &Paddle, _ball: &Ball) -> PaddleCommand {
        PaddleCommand::Velocity(self.signal)
    }
}

/// Absolute input (pointer or stick position mapped across the lane)
///
/// `None` means the input was released and the paddle holds its position.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteInput {
    pub signal: Option<f32>,
}

impl MoveSource for AbsoluteInput {
    fn command(&mut self, paddle: &Paddle, _ball: &Ball) -> PaddleCommand {
        match self.signal {
            Some(signal) => {
                let t = (signal.clamp(-1.0, 1.0) + 1.0) * 0.5;
                PaddleCommand::Seek {
                    target: paddle.lane_min + t * (paddle.lane_max - paddle.lane_min),
                    gain: ABSOLUTE_INPUT_GAIN,
                }
            }
            None => PaddleCommand::Hold,
        }
    }
}

/// Computer opponent: meets an approaching ball, drifts to centre otherwise
#[derive(Debug, Clone, Copy)]
pub struct TrackingAi {
    pub gain: f32,
}

impl Default for TrackingAi {
    fn default() -> Self {
        Self {
            gain: TRACKING_AI_GAIN,
        }
    }
}

impl TrackingAi {
    /// Lane coordinate where the ball will cross the paddle's face line
    ///
    /// Assumes constant velocity. Returns `None` unless the ball is closing in.
    pub fn predict_intercept(paddle: &Paddle, ball: &Ball) -> Option<f32> {
        let face = paddle.face();
        let closing = -ball.vel.dot(face);
        if closing <= EPSILON {
            return None;
        }
        let distance = (ball.pos - paddle.pos).dot(face);
        let time = distance / closing;
        Some((ball.pos + ball.vel * time).dot(paddle.lane_axis))
    }
}

impl MoveSource for TrackingAi {
    fn command(&mut self, paddle: &Paddle, ball: &Ball) -> PaddleCommand {
        let target = if ball.is_active() {
            Self::predict_intercept(paddle, ball).unwrap_or(paddle.lane_center())
        } else {
            paddle.lane_center()
        };
        PaddleCommand::Seek {
            target,
            gain: self.gain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ball::BallState;

    /// Right-hand Pong paddle facing -x, sliding along y in [-4, 4]
    fn right_paddle() -> Paddle {
        Paddle::new(1, Vec2::new(8.0, 0.0), -Vec2::X, 2.0, 0.5).with_lane(Vec2::Y, -4.0, 4.0, 10.0)
    }

    fn ball_at(pos: Vec2, vel: Vec2) -> Ball {
        let mut ball = Ball::new(1, 0.25);
        ball.pos = pos;
        ball.vel = vel;
        ball.speed = vel.length();
        ball
    }

    #[test]
    fn test_new_orients_lane_along_face() {
        let paddle = Paddle::new(1, Vec2::new(8.0, 0.0), -Vec2::X, 2.0, 0.5);
        assert!((paddle.face() + Vec2::X).length() < 0.0001);
        assert!(paddle.lane_axis.dot(Vec2::Y).abs() > 0.9999);
        assert!((paddle.lane_position() - paddle.lane_center()).abs() < 0.0001);

        let flat = Paddle::new(2, Vec2::new(0.0, -6.0), Vec2::Y, 2.0, 0.4);
        assert!((flat.lane_axis - Vec2::X).length() < 0.0001);
        assert_eq!(flat.rotation, 0.0);
    }

    #[test]
    fn test_obstacle_matches_paddle() {
        let paddle = right_paddle();
        let obstacle = paddle.obstacle();
        assert_eq!(obstacle.kind, ObstacleKind::Paddle);
        assert!((obstacle.up() + Vec2::X).length() < 0.0001);
        assert!(obstacle.contains_point(Vec2::new(7.9, 0.9)));
        assert!(!obstacle.contains_point(Vec2::new(7.9, 1.1)));
    }

    #[test]
    fn test_velocity_command_clamps_to_lane() {
        let mut paddle = right_paddle();
        let start = paddle.lane_position();
        paddle.step(PaddleCommand::Velocity(1.0), 0.1);
        assert!((paddle.lane_position() - start - 1.0).abs() < 0.0001);
        assert!((paddle.pos.y - 1.0).abs() < 0.0001);

        for _ in 0..100 {
            paddle.step(PaddleCommand::Velocity(5.0), 0.1);
        }
        assert!((paddle.lane_position() - 4.0).abs() < 0.0001);
        assert_eq!(paddle.velocity, 0.0);
        // Only the lane coordinate changes
        assert!((paddle.pos.x - 8.0).abs() < 0.0001);
    }

    #[test]
    fn test_seek_is_proportional() {
        let mut paddle =
            Paddle::new(1, Vec2::ZERO, Vec2::Y, 2.0, 0.4).with_lane(Vec2::X, -5.0, 5.0, 14.0);
        paddle.step(
            PaddleCommand::Seek {
                target: 0.5,
                gain: 2.0,
            },
            0.1,
        );
        // 0.5 * 2 = 1 unit/s, well under max speed
        assert!((paddle.velocity - 1.0).abs() < 0.0001);

        paddle.step(
            PaddleCommand::Seek {
                target: 5.0,
                gain: 10.0,
            },
            0.1,
        );
        assert!((paddle.velocity - 14.0).abs() < 0.0001);
    }

    #[test]
    fn test_hold_and_reset() {
        let mut paddle = Paddle::new(1, Vec2::new(3.0, -6.0), Vec2::Y, 2.0, 0.4)
            .with_lane(Vec2::X, -5.0, 5.0, 14.0);
        paddle.step(PaddleCommand::Hold, 0.1);
        assert!((paddle.pos.x - 3.0).abs() < 0.0001);
        paddle.reset_to_center();
        assert!(paddle.pos.x.abs() < 0.0001);
        assert!((paddle.pos.y + 6.0).abs() < 0.0001);
    }

    #[test]
    fn test_absolute_input_maps_across_lane() {
        let paddle =
            Paddle::new(1, Vec2::ZERO, Vec2::Y, 2.0, 0.4).with_lane(Vec2::X, -5.0, 5.0, 14.0);
        let ball = Ball::new(1, 0.2);
        let mut input = AbsoluteInput { signal: Some(1.0) };
        assert_eq!(
            input.command(&paddle, &ball),
            PaddleCommand::Seek {
                target: 5.0,
                gain: ABSOLUTE_INPUT_GAIN
            }
        );
        input.signal = Some(-1.0);
        assert!(matches!(
            input.command(&paddle, &ball),
            PaddleCommand::Seek { target, .. } if (target + 5.0).abs() < 0.0001
        ));
        input.signal = None;
        assert_eq!(input.command(&paddle, &ball), PaddleCommand::Hold);
    }

    #[test]
    fn test_ai_predicts_intercept() {
        let paddle = right_paddle();
        let ball = ball_at(Vec2::new(0.0, 0.0), Vec2::new(4.0, 1.0));
        let target = TrackingAi::predict_intercept(&paddle, &ball).unwrap();
        // Two seconds to cover 8 units of x, rising 2 units
        assert!((target - 2.0).abs() < 0.0001);
    }

    #[test]
    fn test_ai_centres_when_ball_recedes() {
        let mut paddle = right_paddle();
        paddle.step(PaddleCommand::Velocity(1.0), 0.2);
        let ball = ball_at(Vec2::ZERO, Vec2::new(-4.0, 1.0));
        let mut ai = TrackingAi::default();
        assert!(matches!(
            ai.command(&paddle, &ball),
            PaddleCommand::Seek { target, gain }
                if target.abs() < 0.0001 && gain == TRACKING_AI_GAIN
        ));
    }

    #[test]
    fn test_ai_centres_while_ball_hidden() {
        let paddle = right_paddle();
        let mut ball = ball_at(Vec2::new(0.0, 3.0), Vec2::new(4.0, 0.0));
        ball.state = BallState::ResettingHidden { remaining: 1.0 };
        let mut ai = TrackingAi::default();
        assert!(matches!(
            ai.command(&paddle, &ball),
            PaddleCommand::Seek { target, .. } if target.abs() < 0.0001
        ));
    }
}
