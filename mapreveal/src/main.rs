//! MapReveal CLI - replays the answer reveal of a map-guessing game.
//!
//! The binary hosts a round actor against a console map widget that logs its
//! camera moves and an in-memory game store, then walks a scripted game
//! through every round:
//!
//! 1. **`run`** (the default): loads a scenario (the built-in five-round demo
//!    unless `--scenario` is given), reveals each round once everyone has
//!    answered, and prints the markers and score changes.
//! 2. **`bounds`**: prints the bounding box the reveal would fit for a list
//!    of `LNG,LAT` points, in degrees. Zero-width axes are widened; the pixel
//!    padding is applied by the map widget and is not included.
//!
//! Reveal timings can be tuned through the `MAPREVEAL_*` environment variables
//! read by [`reveal_session::RevealConfig::from_env`]; host tunables live in
//! [`config`].

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use reveal_core::{calculate_bounds, Coordinate};
use reveal_session::RevealConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod console;
mod play;
mod scenario;

use play::{GameReport, PlayOptions};
use scenario::Scenario;

#[derive(Parser)]
#[command(name = "mapreveal", about = "Replay the answer reveal of a map-guessing game")]
struct Cli {
    /// Optional subcommand. When omitted, plays the built-in demo.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario round by round.
    Run(RunArgs),

    /// Print the fitted bounds for a set of points.
    Bounds {
        /// Points as `LNG,LAT`, e.g. `139.69,35.68`.
        #[arg(required = true, allow_hyphen_values = true, value_parser = parse_lng_lat)]
        points: Vec<Coordinate>,
    },
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Scenario JSON file. Defaults to the built-in demo.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Playback speed; 2 halves every animation delay.
    #[arg(long, default_value_t = 1.0, value_parser = parse_speed)]
    speed: f64,

    /// Write daily-rolling log files here instead of stderr.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Reject the first finalize call of this round (1-based).
    #[arg(long, value_name = "ROUND", value_parser = clap::value_parser!(u64).range(1..))]
    fail_finalize: Option<u64>,

    /// Print the game report as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_lng_lat(raw: &str) -> Result<Coordinate, String> {
    let (lng, lat) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LNG,LAT, got '{}'", raw))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("bad longitude '{}': {}", lng, e))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("bad latitude '{}': {}", lat, e))?;
    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("point out of range: {}", raw));
    }
    Ok(Coordinate::from_lng_lat([lng, lat]))
}

fn parse_speed(raw: &str) -> Result<f64, String> {
    let speed: f64 = raw.parse().map_err(|e| format!("bad speed: {}", e))?;
    if !speed.is_finite() || speed <= 0.0 {
        return Err("speed must be a positive number".into());
    }
    Ok(speed)
}

/// Route logs to `log_dir` (daily rolling, no ANSI) or to stderr.
///
/// The returned guard must be held until exit so buffered lines are flushed.
fn init_tracing(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(dir, "mapreveal");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();
    Ok(Some(guard))
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let log_dir = args.log_dir.clone().or_else(config::get_log_dir);
    let _guard = init_tracing(log_dir.as_deref())?;

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => Scenario::demo()?,
    };

    let reveal_config = RevealConfig::from_env().scaled(1.0 / args.speed);
    tracing::info!(
        rounds = scenario.round_count(),
        players = scenario.players.len(),
        reveal_ms = reveal_config.reveal_duration().as_millis() as u64,
        "MapReveal starting"
    );

    let options = PlayOptions {
        fail_finalize: args.fail_finalize.map(|round| (round - 1) as usize),
        mount_delay: config::get_mount_delay(),
    };
    let report = play::play(&scenario, reveal_config, options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    tracing::info!("MapReveal finished");
    Ok(())
}

fn print_report(report: &GameReport) {
    for round in &report.rounds {
        println!(
            "Round {} (question {}), {} marker(s){}",
            round.round_index + 1,
            round.round_id,
            round.markers.len(),
            if round.attempts > 1 {
                format!(", revealed on attempt {}", round.attempts)
            } else {
                String::new()
            }
        );
        for marker in &round.markers {
            println!(
                "  {:>3}  {:<20} {}",
                marker.label,
                marker.coordinate.to_string(),
                marker.color.css_class()
            );
        }
        for player in &round.players {
            println!(
                "  {:<4} {:>7} (+{})",
                player.initials,
                player.score,
                player.score_delta()
            );
        }
        println!();
    }

    if let Some(last) = report.rounds.last() {
        if let Some(leader) = last.players.iter().max_by_key(|p| p.score) {
            let ending = if report.game_over { "Game over" } else { "Scenario finished" };
            println!("{}: {} leads with {}", ending, leader.initials, leader.score);
        }
    }
}

fn format_bounds(points: &[Coordinate]) -> anyhow::Result<String> {
    let bounds = calculate_bounds(points)?;
    let [[min_lng, min_lat], [max_lng, max_lat]] = bounds.to_corners();
    Ok(format!(
        "southwest: {},{}\nnortheast: {},{}\ncenter:    {}",
        min_lng,
        min_lat,
        max_lng,
        max_lat,
        bounds.center()
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => run(RunArgs {
            speed: 1.0,
            ..RunArgs::default()
        })
        .await,
        Some(Commands::Run(args)) => run(args).await,
        Some(Commands::Bounds { points }) => {
            println!("{}", format_bounds(&points)?);
            Ok(())
        }
    }
}
