mod broadcaster;
mod config;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use common::error::ConfigError;
use common::games::snake::{GameMode, GameSettings, GameStatus, SessionCommand, SessionConfig, SnakeSession, TargetScore};
use common::high_score::FileHighScoreStore;
use common::{log, logger};
use tokio::sync::mpsc;

use broadcaster::{build_commentary, ConsoleBroadcaster};
use config::Validate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Normal,
    Wrap,
    Stop,
    God,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Normal => GameMode::Normal,
            ModeArg::Wrap => GameMode::Wrap,
            ModeArg::Stop => GameMode::Stop,
            ModeArg::God => GameMode::God,
        }
    }
}

#[derive(Parser)]
#[command(name = "neon_snake_runner", about = "Plays autopilot snake games in the terminal")]
struct Args {
    /// Config file; defaults to neon_snake_runner_config.yaml next to the executable.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    grid_size: Option<i32>,
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    #[arg(long)]
    food_count: Option<u32>,
    /// A number or `max`.
    #[arg(long, value_parser = parse_target_score)]
    target_score: Option<TargetScore>,
    #[arg(long)]
    tick_interval_ms: Option<u64>,
    #[arg(long, default_value_t = 1)]
    games: u32,
    /// Seed of the first game; later games use seed + index.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    use_log_prefix: bool,
    #[arg(long)]
    no_commentary: bool,
    /// Log every tick.
    #[arg(long)]
    verbose: bool,
}

fn parse_target_score(value: &str) -> Result<TargetScore, String> {
    if value.eq_ignore_ascii_case("max") {
        return Ok(TargetScore::Max);
    }
    value
        .parse::<u32>()
        .map(TargetScore::Finite)
        .map_err(|_| format!("expected a number or 'max', got '{}'", value))
}

fn apply_overrides(settings: &mut GameSettings, args: &Args) {
    if let Some(grid_size) = args.grid_size {
        settings.grid_size = grid_size;
    }
    if let Some(mode) = args.mode {
        settings.mode = mode.into();
    }
    if let Some(food_count) = args.food_count {
        settings.food_count = food_count;
    }
    if let Some(target_score) = args.target_score {
        settings.target_score = target_score;
    }
    if let Some(tick_interval_ms) = args.tick_interval_ms {
        settings.tick_interval_ms = tick_interval_ms;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Runner".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let mut runner_config = config::get_config_manager(args.config.clone()).get_config()?;
    apply_overrides(&mut runner_config.snake, &args);
    if args.no_commentary {
        runner_config.commentary.enabled = false;
    }
    runner_config.validate().map_err(ConfigError::Validation)?;

    let broadcaster = ConsoleBroadcaster::new(build_commentary(&runner_config.commentary), args.verbose);

    let mut wins = 0;
    let mut best_score = 0;
    let mut played = 0;

    for game in 0..args.games {
        let session_config = SessionConfig {
            settings: runner_config.snake.clone(),
            autopilot: true,
            seed: args.seed.map(|seed| seed.wrapping_add(game as u64)),
        };
        let high_scores = FileHighScoreStore::from_yaml_file(&runner_config.high_score_path);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        log!("Game {}/{}", game + 1, args.games);
        let mut session = tokio::spawn(SnakeSession::run(
            session_config,
            broadcaster.clone(),
            high_scores,
            command_rx,
        ));

        let mut interrupted = false;
        let summary = tokio::select! {
            summary = &mut session => summary?,
            _ = tokio::signal::ctrl_c() => {
                log!("Interrupted, stopping session...");
                interrupted = true;
                let _ = command_tx.send(SessionCommand::Stop);
                session.await?
            }
        };
        broadcaster.flush().await;

        played += 1;
        best_score = best_score.max(summary.score);
        if summary.status == GameStatus::Won {
            wins += 1;
        }
        log!(
            "[seed:{}] {} with score {} after {} ticks{}{}",
            summary.seed,
            summary.status,
            summary.score,
            summary.ticks,
            summary
                .loss_reason
                .map(|reason| format!(" ({:?})", reason))
                .unwrap_or_default(),
            if summary.new_high_score { ", new high score!" } else { "" }
        );

        if interrupted {
            break;
        }
    }

    log!("Played {} game(s): {} won, best score {}", played, wins, best_score);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_score() {
        assert_eq!(parse_target_score("max"), Ok(TargetScore::Max));
        assert_eq!(parse_target_score("MAX"), Ok(TargetScore::Max));
        assert_eq!(parse_target_score("25"), Ok(TargetScore::Finite(25)));
        assert!(parse_target_score("-1").is_err());
        assert!(parse_target_score("lots").is_err());
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let args = Args::parse_from(["neon_snake_runner", "--grid-size", "12", "--mode", "wrap"]);
        let mut settings = GameSettings::default();

        apply_overrides(&mut settings, &args);

        assert_eq!(settings.grid_size, 12);
        assert_eq!(settings.mode, GameMode::Wrap);
        assert_eq!(settings.food_count, GameSettings::default().food_count);
        assert_eq!(settings.target_score, TargetScore::Max);
    }

    #[test]
    fn test_games_default_to_one() {
        let args = Args::parse_from(["neon_snake_runner", "--target-score", "40"]);

        assert_eq!(args.games, 1);
        assert_eq!(args.target_score, Some(TargetScore::Finite(40)));
    }
}
