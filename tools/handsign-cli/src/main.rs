//! Handsign CLI: replay recorded sessions, validate action files, and
//! inspect the orientation classifier.
//!
//! Usage:
//!   handsign replay <SESSION> --actions <FILE>   Replay a session and list performed actions
//!   handsign validate <FILE>                     Check an action file for problems
//!   handsign classify <X> <Y> <Z>                Show the labels a direction receives
//!   handsign synth --output <FILE>               Write a synthetic two-handed session

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use handsign_common::config::AppConfig;
use handsign_model::hand::HandSide;

mod commands;

#[derive(Parser)]
#[command(
    name = "handsign",
    about = "Hand gesture recognition from tracked hand poses",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum HandArg {
    Left,
    Right,
}

impl From<HandArg> for HandSide {
    fn from(hand: HandArg) -> Self {
        match hand {
            HandArg::Left => HandSide::Left,
            HandArg::Right => HandSide::Right,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded session through recognition and dispatch
    Replay {
        /// Path to the session JSONL file
        session: PathBuf,

        /// Path to the action definitions
        #[arg(short, long)]
        actions: PathBuf,

        /// Override the motion distance threshold
        #[arg(long)]
        distance: Option<f64>,

        /// Override the default combo window (seconds)
        #[arg(long)]
        window: Option<f64>,

        /// Raise one gesture per threshold crossing instead of one per tick
        #[arg(long)]
        once_per_crossing: bool,

        /// Keep combo hands armed after completion until their windows elapse
        #[arg(long)]
        keep_combo: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate an action definition file
    Validate {
        /// Path to the action definitions
        path: PathBuf,
    },

    /// Classify a direction against the world axes
    Classify {
        x: f64,
        y: f64,
        z: f64,

        /// Hand the direction belongs to
        #[arg(long, value_enum, default_value = "left")]
        hand: HandArg,

        /// Treat the vector as the hand's lateral axis instead of a motion
        #[arg(long)]
        palm: bool,
    },

    /// Write a synthetic session exercising both hands
    Synth {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Tick rate of the generated session
        #[arg(long, default_value = "50")]
        rate: u32,

        /// Seconds between the left and right hand moves of the clap
        #[arg(long, default_value = "0.2")]
        gap: f64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    handsign_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Replay {
            session,
            actions,
            distance,
            window,
            once_per_crossing,
            keep_combo,
            json,
        } => {
            if let Some(distance) = distance {
                config.recognition.distance_threshold = distance;
            }
            if let Some(window) = window {
                config.combo.window_secs = window;
            }
            if once_per_crossing {
                config.recognition.emission = handsign_common::config::EmissionMode::OncePerCrossing;
            }
            if keep_combo {
                config.combo.reset_on_complete = false;
            }
            commands::replay::run(&config, session, actions, json)
        }
        Commands::Validate { path } => commands::validate::run(&config, path),
        Commands::Classify {
            x,
            y,
            z,
            hand,
            palm,
        } => commands::classify::run(&config, glam::DVec3::new(x, y, z), hand.into(), palm),
        Commands::Synth { output, rate, gap } => commands::synth::run(output, rate, gap),
    }
}
