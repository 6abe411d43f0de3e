//! Breakout run rules
//!
//! A single paddle defends the bottom of a vertical arena while the ball clears
//! a grid of scoring blocks. Destroying blocks raises the stage (and with it
//! the ball speed); losing the ball costs a life.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{EntityIds, WALL_THICKNESS};
use crate::consts::SIM_DT;
use crate::settings::{BreakoutSettings, GameStage};
use crate::sim::{
    Ball, BallId, BallSimulator, BlockDamage, CollisionWorld, DamageOutcome, MoveSource, Obstacle,
    ObstacleId, ObstacleKind, Paddle, ResetRequest, SimEvent, Side,
};

const BALL_ID: BallId = 0;

/// Blocks destroyed before stage one gives way to stage two
const STAGE_TWO_BLOCKS: u32 = 4;
/// Blocks destroyed before stage two gives way to stage three
const STAGE_THREE_BLOCKS: u32 = 12;

/// A destructible scoring block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: ObstacleId,
    pub center: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub score: u32,
    /// Grid row counted from the bottom
    pub row: u32,
}

impl Block {
    pub fn obstacle(&self) -> Obstacle {
        Obstacle::new(self.id, ObstacleKind::Block, self.center, self.size)
    }
}

/// The live blocks of a run, sorted by id
#[derive(Debug, Clone, Default)]
pub struct BlockField {
    blocks: Vec<Block>,
}

impl BlockField {
    /// Tessellate the configured bounds with blocks
    ///
    /// Counts round up, so the last row and column may overhang the bounds.
    pub fn generate(settings: &BreakoutSettings, ids: &mut EntityIds) -> Self {
        let size = settings.block_size;
        let Some((columns, rows)) = settings.block_grid() else {
            log::warn!("Block size {:?} gives no usable grid, no blocks generated", size);
            return Self::default();
        };

        let mut blocks = Vec::with_capacity(columns as usize * rows as usize);
        for x in 0..columns {
            for y in 0..rows {
                let center = settings.block_bounds_min
                    + Vec2::new(x as f32 * size.x, y as f32 * size.y)
                    + size * 0.5;
                blocks.push(Block {
                    id: ids.next_entity_id(),
                    center,
                    size,
                    health: settings.block_health,
                    score: row_score(settings, y),
                    row: y,
                });
            }
        }

        log::debug!("Generated {}x{} block grid", columns, rows);
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn obstacles(&self) -> impl Iterator<Item = Obstacle> + '_ {
        self.blocks.iter().map(Block::obstacle)
    }
}

impl BlockDamage for BlockField {
    fn damage(&mut self, block: ObstacleId, amount: f32, instigator: BallId) -> DamageOutcome {
        let Some(index) = self.blocks.iter().position(|b| b.id == block) else {
            return DamageOutcome::Missing;
        };

        let target = &mut self.blocks[index];
        target.health -= amount;
        if target.health > 0.0 {
            return DamageOutcome::Damaged {
                remaining: target.health,
            };
        }

        let destroyed = self.blocks.remove(index);
        log::debug!(
            "Block {} (row {}) destroyed by ball {}",
            destroyed.id,
            destroyed.row,
            instigator
        );
        DamageOutcome::Destroyed {
            score: destroyed.score,
        }
    }
}

/// Score for a block in grid row `row` (counted from the bottom)
fn row_score(settings: &BreakoutSettings, row: u32) -> u32 {
    match row {
        0 | 1 => settings.block_score_bottom_rows,
        2 | 3 => settings.block_score_middle_rows,
        4 | 5 => settings.block_score_top_rows,
        _ => settings.block_score_bottom_rows,
    }
}

/// A single Breakout run, from first serve to game over
#[derive(Debug, Clone)]
pub struct BreakoutRun {
    settings: BreakoutSettings,
    ids: EntityIds,
    sim: BallSimulator,
    /// Side walls, ceiling and the goal below the paddle
    arena: Vec<Obstacle>,
    paddle: Paddle,
    blocks: BlockField,
    stage: GameStage,
    lives: u32,
    score: u32,
    blocks_destroyed: u32,
    time_ticks: u64,
}

impl BreakoutRun {
    pub fn new(settings: BreakoutSettings, seed: u64) -> Self {
        let mut ids = EntityIds::default();
        let w = settings.arena_width;
        let h = settings.arena_height;
        let t = WALL_THICKNESS;

        let arena = vec![
            ids.obstacle(ObstacleKind::Wall, Vec2::new(-(w + t) * 0.5, 0.0), Vec2::new(t, h)),
            ids.obstacle(ObstacleKind::Wall, Vec2::new((w + t) * 0.5, 0.0), Vec2::new(t, h)),
            ids.obstacle(
                ObstacleKind::Wall,
                Vec2::new(0.0, (h + t) * 0.5),
                Vec2::new(w + 2.0 * t, t),
            ),
            ids.obstacle(
                ObstacleKind::Goal(Side::Player),
                Vec2::new(0.0, -(h + t) * 0.5),
                Vec2::new(w + 2.0 * t, t),
            ),
        ];

        let mut paddle = Paddle::new(
            ids.next_entity_id(),
            Vec2::new(0.0, settings.paddle_y),
            Vec2::Y,
            settings.paddle_width,
            settings.paddle_height,
        )
        .with_lane(Vec2::X, settings.x_minimum, settings.x_maximum, settings.paddle_speed);
        paddle.reset_to_center();

        let blocks = BlockField::generate(&settings, &mut ids);
        let stage = GameStage::StageOne;
        let sim = BallSimulator::new(
            BALL_ID,
            settings.ball_radius,
            settings.parameters_for(stage),
            seed,
        );

        log::info!("Breakout run: {} blocks, {} lives", blocks.len(), settings.player_lives);

        Self {
            lives: settings.player_lives,
            settings,
            ids,
            sim,
            arena,
            paddle,
            blocks,
            stage,
            score: 0,
            blocks_destroyed: 0,
            time_ticks: 0,
        }
    }

    pub fn settings(&self) -> &BreakoutSettings {
        &self.settings
    }

    pub fn ball(&self) -> &Ball {
        self.sim.ball()
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn blocks(&self) -> &BlockField {
        &self.blocks
    }

    pub fn stage(&self) -> GameStage {
        self.stage
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn blocks_destroyed(&self) -> u32 {
        self.blocks_destroyed
    }

    pub fn is_over(&self) -> bool {
        self.stage == GameStage::GameOver
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Obstacle snapshot for the current tick
    pub fn world(&self) -> CollisionWorld {
        let mut world = CollisionWorld::with_obstacles(self.arena.iter().copied());
        world.push(self.paddle.obstacle());
        world.extend(self.blocks.obstacles());
        world
    }

    /// Advance one fixed tick
    pub fn tick(&mut self, player: &mut dyn MoveSource) -> Vec<SimEvent> {
        if self.is_over() {
            return Vec::new();
        }

        let command = player.command(&self.paddle, self.sim.ball());
        self.paddle.step(command, SIM_DT);

        let world = self.world();
        let events = self.sim.advance(SIM_DT, &world, &mut self.blocks);
        self.handle_events(&events);
        self.time_ticks += 1;
        events
    }

    /// Apply scoring, stage and life changes for a batch of simulation events
    pub fn handle_events(&mut self, events: &[SimEvent]) {
        for event in events {
            if self.is_over() {
                return;
            }
            match *event {
                SimEvent::BlockDestroyed { score, .. } => self.block_destroyed(score),
                SimEvent::GoalEntered { side: Side::Player } => self.ball_lost(),
                _ => {}
            }
        }
    }

    fn block_destroyed(&mut self, score: u32) {
        self.score += score;
        self.blocks_destroyed += 1;

        if score >= self.settings.block_score_top_rows {
            self.advance_stage(GameStage::StageFour);
        } else if self.stage == GameStage::StageOne && self.blocks_destroyed >= STAGE_TWO_BLOCKS {
            self.advance_stage(GameStage::StageTwo);
        } else if self.stage == GameStage::StageTwo && self.blocks_destroyed >= STAGE_THREE_BLOCKS
        {
            self.advance_stage(GameStage::StageThree);
        }

        if self.blocks.is_empty() {
            log::info!("Block field cleared with score {}", self.score);
        }
    }

    fn ball_lost(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        log::info!("Ball lost, {} lives left", self.lives);
        if self.lives == 0 {
            self.set_stage(GameStage::GameOver);
            log::info!(
                "Game over: score {} after {} blocks",
                self.score,
                self.blocks_destroyed
            );
        }
    }

    /// Move to a later stage; stages never regress
    fn advance_stage(&mut self, stage: GameStage) {
        if stage > self.stage {
            self.set_stage(stage);
        }
    }

    fn set_stage(&mut self, stage: GameStage) {
        if stage == self.stage {
            return;
        }
        self.stage = stage;
        self.sim.set_parameters(self.settings.parameters_for(stage));
        log::info!(
            "{} (ball speed {})",
            stage.as_str(),
            self.settings.ball_speed(stage)
        );
    }

    /// Regenerate blocks and reset score, lives and stage
    pub fn restart(&mut self) {
        self.blocks = BlockField::generate(&self.settings, &mut self.ids);
        self.score = 0;
        self.blocks_destroyed = 0;
        self.lives = self.settings.player_lives;
        self.time_ticks = 0;
        self.stage = GameStage::StageOne;
        self.sim.set_parameters(self.settings.parameters_for(self.stage));
        self.paddle.reset_to_center();
        self.sim.request_reset(ResetRequest::immediate(Side::Player));
        log::info!("Breakout run restarted");
    }
}
