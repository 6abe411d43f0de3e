//! Fixed timestep ball sweep
//!
//! Each tick the ball is swept along its velocity through the collision world.
//! Every impact found within the tick's travel budget is resolved in order, so
//! fast balls bounce off thin obstacles instead of tunnelling through them.
//! The resulting events are returned to the caller for score and audio
//! bookkeeping.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallId, BallState, ResetRequest};
use super::response::{
    axis_angle_limit, block_response, paddle_response, speed_limit, wall_response,
};
use super::world::{CollisionWorld, HitResult, ObstacleId, ObstacleKind, Side};
use crate::consts::{MAX_IMPACTS_PER_TICK, OVERSHOOT_FACTOR};
use crate::rotate;
use crate::settings::SimulationParameters;

/// Events emitted by a tick, consumed synchronously by the rules layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    WallBounce,
    PaddleBounce { paddle: ObstacleId },
    BlockBounce { block: ObstacleId },
    BlockDestroyed { block: ObstacleId, score: u32 },
    GoalEntered { side: Side },
    /// The reset wait elapsed and the ball is visible and moving again
    BallServed,
}

/// Result of damaging a block
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    Damaged { remaining: f32 },
    /// Health reached zero; reported once, on the destroying hit
    Destroyed { score: u32 },
    /// The block is already gone from the owner's records
    Missing,
}

/// Owner of destructible block health
pub trait BlockDamage {
    fn damage(&mut self, block: ObstacleId, amount: f32, instigator: BallId) -> DamageOutcome;
}

/// Block owner for arenas without destructible blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBlocks;

impl BlockDamage for NoBlocks {
    fn damage(&mut self, _block: ObstacleId, _amount: f32, _instigator: BallId) -> DamageOutcome {
        DamageOutcome::Missing
    }
}

/// Owns a ball and advances it one fixed tick at a time
#[derive(Debug, Clone)]
pub struct BallSimulator {
    ball: Ball,
    params: SimulationParameters,
    rng: Pcg32,
}

impl BallSimulator {
    /// Create a simulator with the ball already served toward the player
    pub fn new(id: BallId, radius: f32, params: SimulationParameters, seed: u64) -> Self {
        let mut sim = Self {
            ball: Ball::new(id, radius),
            params,
            rng: Pcg32::seed_from_u64(seed),
        };
        sim.request_reset(ResetRequest::immediate(Side::Player));
        sim
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Swap parameters wholesale (stage change)
    ///
    /// The ball's speed snaps to the new staged speed (held to the cap) from
    /// the next tick.
    pub fn set_parameters(&mut self, params: SimulationParameters) {
        self.params = params;
        self.ball.speed = self.capped_speed(self.params.ball_speed);
    }

    /// Place the ball and set it moving, bypassing the serve
    pub fn launch(&mut self, pos: Vec2, vel: Vec2) {
        self.ball.pos = pos;
        self.ball.vel = speed_limit(vel, self.params.speed_cap);
        self.ball.speed = self.ball.vel.length();
        self.ball.state = BallState::Active;
    }

    /// Re-serve the ball, overriding any reset already in progress
    pub fn request_reset(&mut self, request: ResetRequest) {
        let params = &self.params;
        let axis = params.travel_axis;

        let lo = params.lateral_min + self.ball.radius;
        let hi = params.lateral_max - self.ball.radius;
        let lateral = if lo < hi {
            self.rng.random_range(lo..=hi)
        } else {
            (params.lateral_min + params.lateral_max) * 0.5
        };
        self.ball.pos =
            axis.unit() * params.spawn_origin.dot(axis.unit()) + axis.lateral() * lateral;

        let heading = match request.losing_side {
            Side::Player => -axis.unit(),
            Side::Opponent => axis.unit(),
        };
        let sign = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let speed = self.capped_speed(params.ball_speed);
        self.ball.vel = rotate(heading, params.serve_angle * sign) * speed;
        self.ball.speed = speed;
        self.ball.block_collision_armed = true;

        self.ball.state = if request.skip_wait || params.reset_wait <= 0.0 {
            BallState::Active
        } else {
            BallState::ResettingHidden {
                remaining: params.reset_wait,
            }
        };

        log::debug!(
            "Ball {} reset toward {:?} at ({:.2}, {:.2}), state {:?}",
            self.ball.id,
            request.losing_side,
            self.ball.pos.x,
            self.ball.pos.y,
            self.ball.state
        );
    }

    /// Advance the ball by one fixed timestep
    pub fn advance(
        &mut self,
        dt: f32,
        world: &CollisionWorld,
        blocks: &mut dyn BlockDamage,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();

        if let BallState::ResettingHidden { remaining } = self.ball.state {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.ball.state = BallState::Active;
                events.push(SimEvent::BallServed);
            } else {
                self.ball.state = BallState::ResettingHidden { remaining };
            }
            return events;
        }

        if !self.ball.vel.is_finite() {
            log::warn!("Ball {} had non-finite velocity, stopping it", self.ball.id);
            self.ball.vel = Vec2::ZERO;
        }
        if !self.ball.speed.is_finite() {
            self.ball.speed = 0.0;
        }
        self.ball.speed = self.capped_speed(self.ball.speed);

        let budget = self.ball.vel.length() * dt * OVERSHOOT_FACTOR;
        let mut traveled = 0.0;
        let mut origin = self.ball.pos;
        let mut impacts = 0;
        let mut stale: Vec<ObstacleId> = Vec::new();

        while traveled < budget {
            if impacts >= MAX_IMPACTS_PER_TICK {
                log::debug!("Ball {} hit impact limit this tick", self.ball.id);
                break;
            }

            let direction = self.ball.vel.normalize_or_zero();
            if direction == Vec2::ZERO {
                break;
            }

            let Some(hit) = world.query_excluding(
                origin,
                direction,
                budget - traveled,
                self.ball.effective_mask(),
                true,
                &stale,
            ) else {
                break;
            };
            impacts += 1;

            if let ObstacleKind::Goal(side) = hit.obstacle.kind {
                log::info!("Ball {} entered {:?} goal", self.ball.id, side);
                events.push(SimEvent::GoalEntered { side });
                self.request_reset(ResetRequest::new(side));
                return events;
            }

            if !self.resolve_impact(&hit, blocks, &mut events) {
                // Pass through and keep sweeping from the same origin
                stale.push(hit.obstacle.id);
                continue;
            }
            traveled += hit.distance;
            origin = hit.point;
        }

        self.ball.vel = self.ball.vel.normalize_or_zero() * self.ball.speed;
        self.ball.pos += self.ball.vel * dt;

        self.ball.vel = speed_limit(
            axis_angle_limit(self.ball.vel, &self.params),
            self.params.speed_cap,
        );

        events
    }

    /// `speed` held to the configured cap
    fn capped_speed(&self, speed: f32) -> f32 {
        match self.params.speed_cap {
            Some(cap) => speed.min(cap),
            None => speed,
        }
    }

    /// Apply the response for one solid impact
    ///
    /// Returns false when the obstacle should be ignored for the rest of the tick.
    fn resolve_impact(
        &mut self,
        hit: &HitResult,
        blocks: &mut dyn BlockDamage,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        let obstacle = &hit.obstacle;

        let bounce = match obstacle.kind {
            ObstacleKind::Wall => {
                self.ball.vel = wall_response(self.ball.vel, hit.normal);
                self.ball.block_collision_armed = true;
                SimEvent::WallBounce
            }
            ObstacleKind::Paddle => {
                self.ball.vel =
                    paddle_response(self.ball.vel, hit.point, obstacle, &self.params);
                self.ball.speed = self.capped_speed(self.ball.vel.length());
                self.ball.block_collision_armed = true;
                SimEvent::PaddleBounce {
                    paddle: obstacle.id,
                }
            }
            ObstacleKind::Block => {
                let outcome = blocks.damage(obstacle.id, self.params.block_damage, self.ball.id);
                if outcome == DamageOutcome::Missing {
                    log::warn!("Ball {} hit stale block {}, ignoring", self.ball.id, obstacle.id);
                    return false;
                }
                self.ball.vel = block_response(self.ball.vel, self.params.travel_axis);
                self.ball.block_collision_armed = false;
                push_bounce(events, SimEvent::BlockBounce { block: obstacle.id });
                if let DamageOutcome::Destroyed { score } = outcome {
                    events.push(SimEvent::BlockDestroyed {
                        block: obstacle.id,
                        score,
                    });
                }
                log::debug!("Ball {} hit block {} ({:?})", self.ball.id, obstacle.id, outcome);
                return true;
            }
            ObstacleKind::Goal(_) => return false,
        };

        log::debug!(
            "Ball {} bounced off {:?} {} at ({:.2}, {:.2})",
            self.ball.id,
            obstacle.kind,
            obstacle.id,
            hit.point.x,
            hit.point.y
        );
        push_bounce(events, bounce);
        true
    }
}

/// Record a bounce unless one of the same kind was already reported this tick
fn push_bounce(events: &mut Vec<SimEvent>, bounce: SimEvent) {
    let kind = std::mem::discriminant(&bounce);
    if !events.iter().any(|e| std::mem::discriminant(e) == kind) {
        events.push(bounce);
    }
}
