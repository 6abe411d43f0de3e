//! Pong match rules
//!
//! Two paddles guard goals at either end of a horizontal arena. A ball entering
//! a goal scores a point for the other side; the first side to reach the
//! winning score takes the match.

use glam::Vec2;

use super::{EntityIds, WALL_THICKNESS};
use crate::consts::SIM_DT;
use crate::settings::PongSettings;
use crate::sim::{
    Ball, BallSimulator, CollisionWorld, MoveSource, NoBlocks, Obstacle, ObstacleKind, Paddle,
    ResetRequest, SimEvent, Side,
};

const BALL_ID: u32 = 0;

/// A single Pong match
#[derive(Debug, Clone)]
pub struct PongMatch {
    settings: PongSettings,
    sim: BallSimulator,
    /// Walls and goals, in registration order
    arena: Vec<Obstacle>,
    /// Left paddle, facing +x
    player: Paddle,
    /// Right paddle, facing -x
    opponent: Paddle,
    player_score: u32,
    opponent_score: u32,
    winner: Option<Side>,
    time_ticks: u64,
}

impl PongMatch {
    pub fn new(settings: PongSettings, seed: u64) -> Self {
        let mut ids = EntityIds::default();
        let w = settings.arena_width;
        let h = settings.arena_height;
        let t = WALL_THICKNESS;

        let arena = vec![
            ids.obstacle(ObstacleKind::Wall, Vec2::new(0.0, (h + t) * 0.5), Vec2::new(w, t)),
            ids.obstacle(ObstacleKind::Wall, Vec2::new(0.0, -(h + t) * 0.5), Vec2::new(w, t)),
            ids.obstacle(
                ObstacleKind::Goal(Side::Player),
                Vec2::new(-(w + t) * 0.5, 0.0),
                Vec2::new(t, h + 2.0 * t),
            ),
            ids.obstacle(
                ObstacleKind::Goal(Side::Opponent),
                Vec2::new((w + t) * 0.5, 0.0),
                Vec2::new(t, h + 2.0 * t),
            ),
        ];

        let paddle = |id, x: f32, face| {
            Paddle::new(id, Vec2::new(x, 0.0), face, settings.paddle_height, settings.paddle_width)
                .with_lane(Vec2::Y, settings.y_minimum, settings.y_maximum, settings.paddle_speed)
        };
        let mut player = paddle(ids.next_entity_id(), -settings.paddle_inset, Vec2::X);
        let mut opponent = paddle(ids.next_entity_id(), settings.paddle_inset, -Vec2::X);
        player.reset_to_center();
        opponent.reset_to_center();

        let sim = BallSimulator::new(BALL_ID, settings.ball_radius, settings.parameters(), seed);

        log::info!(
            "Pong match: {}x{} arena, first to {}",
            settings.arena_width,
            settings.arena_height,
            settings.winning_score
        );

        Self {
            settings,
            sim,
            arena,
            player,
            opponent,
            player_score: 0,
            opponent_score: 0,
            winner: None,
            time_ticks: 0,
        }
    }

    pub fn settings(&self) -> &PongSettings {
        &self.settings
    }

    pub fn ball(&self) -> &Ball {
        self.sim.ball()
    }

    pub fn player(&self) -> &Paddle {
        &self.player
    }

    pub fn opponent(&self) -> &Paddle {
        &self.opponent
    }

    pub fn player_score(&self) -> u32 {
        self.player_score
    }

    pub fn opponent_score(&self) -> u32 {
        self.opponent_score
    }

    /// Side that won, once the match is over
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Obstacle snapshot for the current tick
    pub fn world(&self) -> CollisionWorld {
        let mut world = CollisionWorld::with_obstacles(self.arena.iter().copied());
        world.push(self.player.obstacle());
        world.push(self.opponent.obstacle());
        world
    }

    /// Advance one fixed tick
    pub fn tick(
        &mut self,
        player: &mut dyn MoveSource,
        opponent: &mut dyn MoveSource,
    ) -> Vec<SimEvent> {
        if self.is_over() {
            return Vec::new();
        }

        let player_command = player.command(&self.player, self.sim.ball());
        let opponent_command = opponent.command(&self.opponent, self.sim.ball());
        self.player.step(player_command, SIM_DT);
        self.opponent.step(opponent_command, SIM_DT);

        let world = self.world();
        let events = self.sim.advance(SIM_DT, &world, &mut NoBlocks);
        self.handle_events(&events);
        self.time_ticks += 1;
        events
    }

    /// Apply scoring for a batch of simulation events
    pub fn handle_events(&mut self, events: &[SimEvent]) {
        for event in events {
            let SimEvent::GoalEntered { side } = *event else {
                continue;
            };
            if self.is_over() {
                return;
            }

            let scorer = side.opposite();
            let score = match scorer {
                Side::Player => &mut self.player_score,
                Side::Opponent => &mut self.opponent_score,
            };
            *score += 1;
            log::info!(
                "{:?} scored: {} - {}",
                scorer,
                self.player_score,
                self.opponent_score
            );

            if self.player_score >= self.settings.winning_score
                || self.opponent_score >= self.settings.winning_score
            {
                self.winner = Some(scorer);
                log::info!("{:?} wins the match after {} ticks", scorer, self.time_ticks);
            }
        }
    }

    /// Clear scores and serve toward the player
    pub fn restart(&mut self) {
        self.player_score = 0;
        self.opponent_score = 0;
        self.winner = None;
        self.time_ticks = 0;
        self.player.reset_to_center();
        self.opponent.reset_to_center();
        self.sim.set_parameters(self.settings.parameters());
        self.sim.request_reset(ResetRequest::immediate(Side::Player));
        log::info!("Pong match restarted");
    }
}
