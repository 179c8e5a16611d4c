//! hand_command — entry point.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;
use gesture_classifier::{GestureClassifier, ThumbRule};
use gesture_commands::CommandMap;
use hand_command::{run, run_headless, AppConfig, AppError};

#[derive(Parser, Debug)]
#[command(name = "hand_command", version, about = "Hand gesture to text command demo")]
struct Cli {
    /// JSON command table, e.g. {"OPEN_PALM": "Start"}; built-in defaults otherwise
    #[arg(long, value_name = "FILE")]
    commands: Option<PathBuf>,

    /// Sample list appended to with R; created on first record
    #[arg(long, value_name = "FILE")]
    samples: Option<PathBuf>,

    /// Classify frames without a window and print LABEL<TAB>command lines
    #[arg(long)]
    headless: bool,

    /// JSON-lines frame file: headless input (default stdin) or windowed replay
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Thumb extension test: `lateral` (hand-relative) or `screen-x`
    #[arg(long, default_value = "lateral")]
    thumb_rule: ThumbRule,

    /// Show the camera view unmirrored
    #[arg(long)]
    no_mirror: bool,

    /// Write the built-in command table to FILE and exit
    #[arg(long, value_name = "FILE")]
    write_default_commands: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<(), AppError> {
    if let Some(path) = &cli.write_default_commands {
        CommandMap::default().save(path)?;
        println!("Wrote default command table to {}", path.display());
        return Ok(());
    }

    let commands = match &cli.commands {
        Some(path) => CommandMap::load(path)?,
        None       => CommandMap::default(),
    };

    if cli.headless {
        let classifier = GestureClassifier::new(cli.thumb_rule);
        let stdout = io::stdout().lock();
        match &cli.input {
            Some(path) => run_headless(BufReader::new(File::open(path)?), stdout, classifier, &commands)?,
            None       => run_headless(io::stdin().lock(), stdout, classifier, &commands)?,
        };
        return Ok(());
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║           Hand Command — gesture to text command             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let cfg = AppConfig {
        commands,
        thumb_rule:     cli.thumb_rule,
        samples_path:   cli.samples,
        replay:         cli.input,
        mirror_display: !cli.no_mirror,
    };
    println!("  Mode: {}", cfg.source_mode());
    println!("  Thumb rule: {}", cfg.thumb_rule.name());
    println!();
    println!("  Opening visualizer window…");
    println!();

    run(cfg)
}
