//! Game variant tunables
//!
//! Each game variant is described by a flat set of named numbers loaded from
//! JSON. Angles are stored in degrees and converted to radians when the
//! per-stage `SimulationParameters` are built. Validation happens once at load
//! time; the simulation never re-checks these values.

use std::path::Path;

use glam::Vec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::consts::{EPSILON, MAX_BLOCKS};
use crate::error::ConfigError;

/// Axis the ball predominantly travels along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TravelAxis {
    /// Left/right travel (Pong)
    #[default]
    Horizontal,
    /// Up/down travel (Breakout)
    Vertical,
}

impl TravelAxis {
    /// Unit vector pointing toward the opponent end of the axis
    #[inline]
    pub fn unit(self) -> Vec2 {
        match self {
            TravelAxis::Horizontal => Vec2::X,
            TravelAxis::Vertical => Vec2::Y,
        }
    }

    /// Unit vector across the axis (the direction paddles slide along)
    #[inline]
    pub fn lateral(self) -> Vec2 {
        match self {
            TravelAxis::Horizontal => Vec2::Y,
            TravelAxis::Vertical => Vec2::X,
        }
    }

    /// The end of the axis `velocity` is biased toward
    ///
    /// A velocity perpendicular to the axis counts as heading to the opponent end.
    #[inline]
    pub fn heading(self, velocity: Vec2) -> Vec2 {
        let unit = self.unit();
        if velocity.dot(unit) < 0.0 { -unit } else { unit }
    }
}

/// Ball tunables for one game variant and stage
///
/// Angles are in radians. Swapped wholesale between stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Speed the ball is renormalized to every tick (until paddle hits raise it)
    pub ball_speed: f32,
    /// Maximum deviation from the paddle normal and from the travel axis
    pub max_ball_angle: f32,
    /// Maximum deviation a paddle's shaping may add to a flat reflection
    pub max_angle_change: Option<f32>,
    /// Serve direction deviation from the travel axis
    pub serve_angle: f32,
    /// Fractional speed increase per paddle hit
    pub speed_increase_on_hit: f32,
    /// Absolute speed limit
    pub speed_cap: Option<f32>,
    /// Seconds the ball stays hidden after a goal
    pub reset_wait: f32,
    pub travel_axis: TravelAxis,
    /// Serve position; only its travel-axis coordinate is used
    pub spawn_origin: Vec2,
    /// Lateral serve bounds (ball radius is kept inside them)
    pub lateral_min: f32,
    pub lateral_max: f32,
    /// Damage dealt to a block per hit
    pub block_damage: f32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        PongSettings::default().parameters()
    }
}

/// Breakout difficulty stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum GameStage {
    GameOver,
    #[default]
    StageOne,
    StageTwo,
    StageThree,
    StageFour,
}

impl GameStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStage::GameOver => "Game Over",
            GameStage::StageOne => "Stage 1",
            GameStage::StageTwo => "Stage 2",
            GameStage::StageThree => "Stage 3",
            GameStage::StageFour => "Stage 4",
        }
    }
}

/// Pong tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongSettings {
    pub initial_ball_speed: f32,
    pub maximum_ball_speed: f32,
    /// Serve angle from horizontal (degrees)
    pub initial_ball_angle: f32,
    /// Bounce angle limit from the paddle normal (degrees)
    pub maximum_ball_angle: f32,
    /// Limit on paddle shaping relative to a flat bounce (degrees)
    pub maximum_ball_angle_change: Option<f32>,
    pub ball_speed_increase_on_paddle_hit: f32,
    pub ball_radius: f32,
    /// Paddle thickness along the travel axis
    pub paddle_width: f32,
    /// Paddle face length
    pub paddle_height: f32,
    pub paddle_speed: f32,
    /// Distance of each paddle from the arena center
    pub paddle_inset: f32,
    /// Paddle lane and serve bounds
    pub y_minimum: f32,
    pub y_maximum: f32,
    pub arena_width: f32,
    pub arena_height: f32,
    pub reset_wait: f32,
    pub winning_score: u32,
}

impl Default for PongSettings {
    fn default() -> Self {
        Self {
            initial_ball_speed: 8.0,
            maximum_ball_speed: 16.0,
            initial_ball_angle: 30.0,
            maximum_ball_angle: 60.0,
            maximum_ball_angle_change: None,
            ball_speed_increase_on_paddle_hit: 0.05,
            ball_radius: 0.25,
            paddle_width: 0.5,
            paddle_height: 2.0,
            paddle_speed: 10.0,
            paddle_inset: 8.0,
            y_minimum: -4.0,
            y_maximum: 4.0,
            arena_width: 18.0,
            arena_height: 10.0,
            reset_wait: 1.0,
            winning_score: 5,
        }
    }
}

impl PongSettings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        parse_validated(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_validated(path.as_ref())
    }

    /// Ball parameters for a Pong match
    pub fn parameters(&self) -> SimulationParameters {
        SimulationParameters {
            ball_speed: self.initial_ball_speed,
            max_ball_angle: self.maximum_ball_angle.to_radians(),
            max_angle_change: self.maximum_ball_angle_change.map(f32::to_radians),
            serve_angle: self.initial_ball_angle.to_radians(),
            speed_increase_on_hit: self.ball_speed_increase_on_paddle_hit,
            speed_cap: Some(self.maximum_ball_speed),
            reset_wait: self.reset_wait,
            travel_axis: TravelAxis::Horizontal,
            spawn_origin: Vec2::ZERO,
            lateral_min: self.y_minimum,
            lateral_max: self.y_maximum,
            block_damage: 1.0,
        }
    }
}

/// Breakout tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutSettings {
    /// Ball speed for stages one through four
    pub ball_speed_stages: [f32; 4],
    /// Serve angle from vertical (degrees)
    pub initial_ball_angle: f32,
    /// Bounce angle limit from the paddle normal (degrees)
    pub maximum_ball_angle: f32,
    pub maximum_ball_angle_change: Option<f32>,
    pub ball_radius: f32,
    pub ball_spawn_y: f32,
    /// Paddle face length
    pub paddle_width: f32,
    /// Paddle thickness along the travel axis
    pub paddle_height: f32,
    pub paddle_speed: f32,
    pub paddle_y: f32,
    /// Paddle lane and serve bounds
    pub x_minimum: f32,
    pub x_maximum: f32,
    pub arena_width: f32,
    pub arena_height: f32,
    pub reset_wait: f32,
    pub player_lives: u32,
    /// Region tessellated with blocks
    pub block_bounds_min: Vec2,
    pub block_bounds_max: Vec2,
    pub block_size: Vec2,
    pub block_health: f32,
    pub block_score_bottom_rows: u32,
    pub block_score_middle_rows: u32,
    pub block_score_top_rows: u32,
}

impl Default for BreakoutSettings {
    fn default() -> Self {
        Self {
            ball_speed_stages: [6.0, 8.0, 10.0, 12.0],
            initial_ball_angle: 30.0,
            maximum_ball_angle: 60.0,
            maximum_ball_angle_change: None,
            ball_radius: 0.2,
            ball_spawn_y: -3.0,
            paddle_width: 2.0,
            paddle_height: 0.4,
            paddle_speed: 14.0,
            paddle_y: -6.0,
            x_minimum: -5.0,
            x_maximum: 5.0,
            arena_width: 12.0,
            arena_height: 16.0,
            reset_wait: 1.0,
            player_lives: 3,
            block_bounds_min: Vec2::new(-6.0, 2.0),
            block_bounds_max: Vec2::new(6.0, 5.0),
            block_size: Vec2::new(1.5, 0.5),
            block_health: 1.0,
            block_score_bottom_rows: 1,
            block_score_middle_rows: 4,
            block_score_top_rows: 7,
        }
    }
}

impl BreakoutSettings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        parse_validated(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_validated(path.as_ref())
    }

    /// Ball speed for a stage (zero once the game is over)
    pub fn ball_speed(&self, stage: GameStage) -> f32 {
        match stage {
            GameStage::GameOver => 0.0,
            GameStage::StageOne => self.ball_speed_stages[0],
            GameStage::StageTwo => self.ball_speed_stages[1],
            GameStage::StageThree => self.ball_speed_stages[2],
            GameStage::StageFour => self.ball_speed_stages[3],
        }
    }

    /// Ball parameters for a Breakout stage
    pub fn parameters_for(&self, stage: GameStage) -> SimulationParameters {
        SimulationParameters {
            ball_speed: self.ball_speed(stage),
            max_ball_angle: self.maximum_ball_angle.to_radians(),
            max_angle_change: self.maximum_ball_angle_change.map(f32::to_radians),
            serve_angle: self.initial_ball_angle.to_radians(),
            speed_increase_on_hit: 0.0,
            speed_cap: None,
            reset_wait: self.reset_wait,
            travel_axis: TravelAxis::Vertical,
            spawn_origin: Vec2::new(0.0, self.ball_spawn_y),
            lateral_min: self.x_minimum,
            lateral_max: self.x_maximum,
            block_damage: 1.0,
        }
    }

    /// Block grid dimensions as (columns, rows)
    ///
    /// Counts round up to cover the bounds. `None` when the block size is
    /// degenerate or the grid would exceed `MAX_BLOCKS`.
    pub fn block_grid(&self) -> Option<(u32, u32)> {
        let size = self.block_size;
        if size.x < EPSILON || size.y < EPSILON {
            return None;
        }
        let extent = (self.block_bounds_max - self.block_bounds_min).max(Vec2::ZERO);
        let columns = (extent.x / size.x).ceil();
        let rows = (extent.y / size.y).ceil();
        let cells = columns * rows;
        if cells.is_nan() || cells > MAX_BLOCKS as f32 {
            return None;
        }
        Some((columns as u32, rows as u32))
    }
}

/// Load settings from an optional path, falling back to defaults on any error
pub fn load_or_default<T>(path: Option<&Path>) -> T
where
    T: DeserializeOwned + Default + Validate,
{
    let Some(path) = path else {
        log::info!("Using default settings");
        return T::default();
    };
    match load_validated(path) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            log::warn!("Ignoring settings file {}: {}", path.display(), e);
            T::default()
        }
    }
}

/// Settings records that can be checked after parsing
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

impl Validate for PongSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("initial_ball_speed", self.initial_ball_speed)?;
        check_non_negative("maximum_ball_speed", self.maximum_ball_speed)?;
        check_bounds("ball_speed", self.initial_ball_speed, self.maximum_ball_speed)?;
        check_angle("initial_ball_angle", self.initial_ball_angle)?;
        check_angle("maximum_ball_angle", self.maximum_ball_angle)?;
        if let Some(change) = self.maximum_ball_angle_change {
            check_angle("maximum_ball_angle_change", change)?;
        }
        check_non_negative(
            "ball_speed_increase_on_paddle_hit",
            self.ball_speed_increase_on_paddle_hit,
        )?;
        check_non_negative("ball_radius", self.ball_radius)?;
        check_non_negative("paddle_width", self.paddle_width)?;
        check_non_negative("paddle_height", self.paddle_height)?;
        check_non_negative("paddle_speed", self.paddle_speed)?;
        check_bounds("y", self.y_minimum, self.y_maximum)?;
        check_positive("arena_width", self.arena_width)?;
        check_positive("arena_height", self.arena_height)?;
        check_non_negative("reset_wait", self.reset_wait)?;
        if self.winning_score == 0 {
            return Err(ConfigError::Zero {
                name: "winning_score",
            });
        }
        Ok(())
    }
}

impl Validate for BreakoutSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        for speed in self.ball_speed_stages {
            check_non_negative("ball_speed_stages", speed)?;
        }
        check_angle("initial_ball_angle", self.initial_ball_angle)?;
        check_angle("maximum_ball_angle", self.maximum_ball_angle)?;
        if let Some(change) = self.maximum_ball_angle_change {
            check_angle("maximum_ball_angle_change", change)?;
        }
        check_non_negative("ball_radius", self.ball_radius)?;
        check_non_negative("paddle_width", self.paddle_width)?;
        check_non_negative("paddle_height", self.paddle_height)?;
        check_non_negative("paddle_speed", self.paddle_speed)?;
        check_bounds("x", self.x_minimum, self.x_maximum)?;
        check_positive("arena_width", self.arena_width)?;
        check_positive("arena_height", self.arena_height)?;
        check_non_negative("reset_wait", self.reset_wait)?;
        if self.player_lives == 0 {
            return Err(ConfigError::Zero {
                name: "player_lives",
            });
        }
        check_bounds("block_bounds.x", self.block_bounds_min.x, self.block_bounds_max.x)?;
        check_bounds("block_bounds.y", self.block_bounds_min.y, self.block_bounds_max.y)?;
        check_positive("block_size.x", self.block_size.x)?;
        check_positive("block_size.y", self.block_size.y)?;
        check_positive("block_health", self.block_health)?;
        if self.block_grid().is_none() {
            return Err(ConfigError::TooManyBlocks { max: MAX_BLOCKS });
        }
        Ok(())
    }
}

fn parse_validated<T: DeserializeOwned + Validate>(json: &str) -> Result<T, ConfigError> {
    let settings: T = serde_json::from_str(json)?;
    settings.validate()?;
    Ok(settings)
}

fn load_validated<T: DeserializeOwned + Validate>(path: &Path) -> Result<T, ConfigError> {
    let json = std::fs::read_to_string(path)?;
    parse_validated(&json)
}

fn check_angle(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=90.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::AngleOutOfRange { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn check_bounds(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedBounds { name, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PongSettings::default().validate().is_ok());
        assert!(BreakoutSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = PongSettings::from_json(r#"{ "winning_score": 11 }"#).unwrap();
        assert_eq!(settings.winning_score, 11);
        assert_eq!(settings.paddle_speed, PongSettings::default().paddle_speed);
    }

    #[test]
    fn test_rejects_steep_angle() {
        let err = PongSettings::from_json(r#"{ "maximum_ball_angle": 120.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::AngleOutOfRange {
                name: "maximum_ball_angle",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_negative_speed() {
        let err =
            BreakoutSettings::from_json(r#"{ "ball_speed_stages": [6.0, -1.0, 8.0, 9.0] }"#)
                .unwrap_err();
        assert!(matches!(err, ConfigError::Negative { .. }));
    }

    #[test]
    fn test_rejects_serve_speed_above_cap() {
        let err = PongSettings::from_json(
            r#"{ "initial_ball_speed": 20.0, "maximum_ball_speed": 16.0 }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvertedBounds {
                name: "ball_speed",
                ..
            }
        ));
    }

    #[test]
    fn test_block_grid_is_bounded() {
        let settings = BreakoutSettings::default();
        assert_eq!(settings.block_grid(), Some((8, 6)));

        let tiny = BreakoutSettings {
            block_size: Vec2::new(1.0e-3, 1.0e-3),
            ..Default::default()
        };
        assert_eq!(tiny.block_grid(), None);
        assert!(matches!(
            tiny.validate(),
            Err(ConfigError::TooManyBlocks { max: MAX_BLOCKS })
        ));

        let empty = BreakoutSettings {
            block_bounds_max: BreakoutSettings::default().block_bounds_min,
            ..Default::default()
        };
        assert_eq!(empty.block_grid(), Some((0, 0)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = PongSettings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PongSettings::load("/nonexistent/ricochet/settings.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let settings: PongSettings =
            load_or_default(Some(Path::new("/nonexistent/ricochet/settings.json")));
        assert_eq!(settings, PongSettings::default());
        let settings: BreakoutSettings = load_or_default(None);
        assert_eq!(settings, BreakoutSettings::default());
    }

    #[test]
    fn test_breakout_stage_speeds() {
        let settings = BreakoutSettings::default();
        assert_eq!(settings.parameters_for(GameStage::GameOver).ball_speed, 0.0);
        assert_eq!(settings.parameters_for(GameStage::StageThree).ball_speed, 10.0);
        assert_eq!(
            settings.parameters_for(GameStage::StageOne).travel_axis,
            TravelAxis::Vertical
        );
    }

    #[test]
    fn test_pong_parameters_in_radians() {
        let params = PongSettings::default().parameters();
        assert!((params.max_ball_angle - 60f32.to_radians()).abs() < 1.0e-6);
        assert_eq!(params.speed_cap, Some(16.0));
    }

    #[test]
    fn test_travel_axis_heading() {
        assert_eq!(TravelAxis::Horizontal.heading(Vec2::new(-3.0, 1.0)), -Vec2::X);
        assert_eq!(TravelAxis::Vertical.heading(Vec2::new(3.0, 0.0)), Vec2::Y);
    }
}
