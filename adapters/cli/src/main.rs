#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Whispers session.

mod autopilot;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use whispers_core::{TICKS_PER_SECOND, TITLE};
use whispers_session::{Effect, Session, SessionConfig, TickReport};

/// Runs a Whispers of the Undead session driven by a scripted player.
#[derive(Debug, Parser)]
#[command(name = "whispers", version)]
struct Args {
    /// TOML file describing the seed, wave count and room layout.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides the configured random seed.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum number of ticks to simulate.
    #[arg(short, long, default_value_t = 36_000)]
    ticks: u64,
}

/// Entry point for the Whispers command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load session config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    tracing::debug!(
        "configured seed {} with {} regular waves",
        config.seed,
        config.max_waves
    );

    let mut session = Session::new(&config).context("failed to start session")?;
    println!("{TITLE}");
    present(session.opening());

    let elapsed = play(&mut session, args.ticks);

    let player = session.player();
    println!(
        "{} ticks ({:.1}s), wave {:?}, health {}/{}, essence {}/{}",
        elapsed,
        elapsed as f64 / f64::from(TICKS_PER_SECOND),
        session.current_wave(),
        player.health,
        player.max_health,
        player.essence,
        player.essence_max,
    );
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Plays until the session concludes or the tick budget runs out.
fn play(session: &mut Session, budget: u64) -> u64 {
    for elapsed in 0..budget {
        let commands = autopilot::plan(
            session.play_mode(),
            &session.player(),
            &session.agents(),
            session.upgrade_offer(),
        );
        for command in commands {
            present(&session.submit(command));
        }

        let report = session.tick();
        present(&report);
        if report
            .effects
            .iter()
            .any(|effect| matches!(effect, Effect::Victory | Effect::Defeat))
        {
            return elapsed + 1;
        }
    }
    budget
}

fn present(report: &TickReport) {
    for effect in &report.effects {
        match effect {
            Effect::Narrative { text, .. } => println!("{text}"),
            Effect::UpgradeMenu(choices) => {
                println!("Choose an upgrade:");
                for (index, upgrade) in choices.iter().enumerate() {
                    println!(
                        "  {}. {} - {}",
                        index + 1,
                        upgrade.name(),
                        upgrade.description()
                    );
                }
            }
            Effect::Victory => {
                println!("You Have Prevailed!");
                println!("You have rescued your beloved from the vampire lord.");
            }
            Effect::Defeat => println!("The Darkness Claims You"),
        }
    }
}
