use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use puzzledrop_core::{layout_seed, BoardLayout, GameConfig, Outcome, PuzzleController};
use rand::Rng;
use serde::Serialize;

mod bot;

use bot::{Bot, BotConfig, ConsoleSurface};

#[derive(Parser)]
#[command(name = "puzzledrop-cli", version, about = "Layout dump and simulated rounds for puzzledrop")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the crop offsets and tray positions for one deal.
    Layout {
        #[arg(long)]
        seed: Option<String>,
        #[arg(long, env = "PUZZLEDROP_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Play one round with a simulated player.
    Play(PlayArgs),
}

#[derive(Args)]
struct PlayArgs {
    #[arg(long)]
    seed: Option<String>,
    #[arg(long, env = "PUZZLEDROP_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long)]
    timed: bool,
    #[arg(long)]
    piece_secs: Option<u32>,
    #[arg(long)]
    global_secs: Option<u32>,
    /// Chance that the bot drops a tile on its own slot.
    #[arg(long, default_value_t = 0.85)]
    accuracy: f64,
    /// Chance that the bot holds a tile without dropping it.
    #[arg(long, default_value_t = 0.1)]
    dawdle: f64,
    #[arg(long, default_value_t = 400)]
    think_ms: u64,
    /// Length of one timer second.
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,
    #[arg(long)]
    quiet: bool,
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RoundReport<'a> {
    seed: u32,
    image_url: &'a str,
    timed: bool,
    outcome: Outcome,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Layout { seed, config } => {
            let config = load_config(config.as_deref())?;
            let seed = resolve_seed(seed.as_deref())?;
            let layout = BoardLayout::generate(config.geometry, layout_seed(seed));
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
        Commands::Play(args) => {
            let mut config = load_config(args.config.as_deref())?;
            if args.timed {
                config.apply_param("timed", "1")?;
            }
            if let Some(secs) = args.piece_secs {
                config.apply_param("piece_secs", &secs.to_string())?;
            }
            if let Some(secs) = args.global_secs {
                config.apply_param("global_secs", &secs.to_string())?;
            }
            let seed = resolve_seed(args.seed.as_deref())?;
            eprintln!("seed: {seed:#010x}");

            let image_url = config.image.request_url()?;
            let layout = BoardLayout::generate(config.geometry.clone(), layout_seed(seed));
            let bot_config = BotConfig {
                accuracy: args.accuracy,
                dawdle: args.dawdle,
                think: Duration::from_millis(args.think_ms),
                tick: Duration::from_millis(args.tick_ms.max(1)),
            };
            let mut bot = Bot::new(bot_config, &config.timing, u64::from(seed));
            let timed = config.timing.is_timed();
            let mut controller =
                PuzzleController::start(config, layout, &image_url, ConsoleSurface::new(args.quiet))?;
            let outcome = bot::play(&mut controller, &mut bot).await?;

            println!(
                "outcome: {:?} correct={} wrong={} total={}",
                outcome.phase, outcome.correct, outcome.wrong, outcome.total
            );
            if args.json {
                let report = RoundReport {
                    seed,
                    image_url: controller.image_url(),
                    timed,
                    outcome,
                };
                println!("{}", serde_json::to_string(&report)?);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let raw = std::fs::read_to_string(path)?;
    Ok(GameConfig::from_json(&raw)?)
}

fn resolve_seed(raw: Option<&str>) -> Result<u32, Box<dyn std::error::Error>> {
    match raw {
        Some(raw) => parse_seed_arg(raw),
        None => Ok(rand::rng().random()),
    }
}

fn parse_seed_arg(raw: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)?
    } else {
        trimmed.parse::<u32>()?
    };
    Ok(value)
}
