//! Ricochet entry point
//!
//! Runs a headless AI-driven game and reports the outcome.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ricochet::consts::SIM_DT;
use ricochet::game::{BreakoutRun, PongMatch};
use ricochet::settings::load_or_default;
use ricochet::sim::{SimEvent, TrackingAi};
use ricochet::{BreakoutSettings, PongSettings};

#[derive(Parser, Debug)]
#[command(name = "ricochet")]
#[command(about = "Headless AI-vs-AI Pong or Breakout on the ricochet ball simulation")]
struct Cli {
    /// Game variant to simulate
    #[arg(value_enum, default_value_t = Game::Pong)]
    game: Game,
    /// Settings JSON for the chosen game (defaults are used when omitted)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Fixed ticks to simulate (6000 is two minutes of play)
    #[arg(long, default_value_t = 6000)]
    ticks: u64,
    /// RNG seed for serves (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Game {
    Pong,
    Breakout,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random);
    let settings = cli.settings.as_deref();

    log::info!(
        "Ricochet starting: {:?} for {} ticks, seed {}",
        cli.game,
        cli.ticks,
        seed
    );

    match cli.game {
        Game::Pong => run_pong(load_or_default(settings), cli.ticks, seed),
        Game::Breakout => run_breakout(load_or_default(settings), cli.ticks, seed),
    }
}

fn run_pong(settings: PongSettings, ticks: u64, seed: u64) {
    let mut game = PongMatch::new(settings, seed);
    let mut player = TrackingAi::default();
    // A slightly sluggish opponent so matches actually end
    let mut opponent = TrackingAi { gain: 1.2 };
    let mut rallies = 0u32;

    for _ in 0..ticks {
        let events = game.tick(&mut player, &mut opponent);
        rallies += events
            .iter()
            .filter(|e| matches!(e, SimEvent::PaddleBounce { .. }))
            .count() as u32;
        if game.is_over() {
            break;
        }
    }

    println!(
        "Pong: player {} - opponent {} ({} paddle hits, {:.1}s)",
        game.player_score(),
        game.opponent_score(),
        rallies,
        game.time_ticks() as f32 * SIM_DT
    );
    match game.winner() {
        Some(side) => println!("Winner: {:?}", side),
        None => println!("No winner yet"),
    }
}

fn run_breakout(settings: BreakoutSettings, ticks: u64, seed: u64) {
    let mut game = BreakoutRun::new(settings, seed);
    let mut player = TrackingAi::default();

    for _ in 0..ticks {
        game.tick(&mut player);
        if game.is_over() || game.blocks().is_empty() {
            break;
        }
    }

    println!(
        "Breakout: score {}, {} blocks destroyed, {} left, {} lives, {} ({:.1}s)",
        game.score(),
        game.blocks_destroyed(),
        game.blocks().len(),
        game.lives(),
        game.stage().as_str(),
        game.time_ticks() as f32 * SIM_DT
    );
}
