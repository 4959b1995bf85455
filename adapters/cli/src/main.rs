#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for Lane Defence.
//!
//! Without `--script` the run is played by a seeded autopilot; with it, the
//! JSON command list is replayed verbatim. Logs go to stderr and honour
//! `RUST_LOG`.

mod autoplay;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use lane_defence_core::{Command, Event, GameConfig, RunStatus};
use lane_defence_world::{self as world, query, World};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::autoplay::Autopilot;

#[derive(Debug, Parser)]
#[command(name = "lane-defence")]
#[command(about = "Headless Lane Defence runner")]
#[command(version)]
struct Cli {
    /// TOML file layered over the built-in configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON array of commands to replay instead of autoplaying
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Seed for the autopilot
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Maximum number of fixed ticks the autopilot may run
    #[arg(long, default_value_t = 24_000)]
    max_ticks: u64,

    /// Print the summary as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

/// Running totals of the events a run produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
struct Tally {
    ticks: u64,
    waves_cleared: u32,
    kills: u32,
    leaks: u32,
    gold_collected: u32,
    towers_built: u32,
    spells_cast: u32,
    rejected: u32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => self.ticks += 1,
                Event::WaveCompleted { .. } => self.waves_cleared += 1,
                Event::HostileKilled { .. } => self.kills += 1,
                Event::HostileLeaked { .. } => self.leaks += 1,
                Event::GoldCollected { amount, .. } => self.gold_collected += amount,
                Event::TowerBuilt { .. } => self.towers_built += 1,
                Event::SpellCast { .. } => self.spells_cast += 1,
                Event::CommandRejected { reason } => {
                    debug!(%reason, "autopilot command rejected");
                    self.rejected += 1;
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    status: RunStatus,
    wave: u32,
    total_waves: u32,
    lives: u32,
    gold: u32,
    elapsed_ms: u64,
    tally: Tally,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let mut world = World::new(config);
    info!("{}", query::welcome_banner(&world));

    let tally = match cli.script.as_deref() {
        Some(path) => replay(&mut world, load_script(path)?),
        None => autoplay(&mut world, cli.seed, cli.max_ticks),
    };

    let stats = query::stats(&world);
    let summary = Summary {
        status: stats.status,
        wave: stats.wave,
        total_waves: stats.total_waves,
        lives: stats.lives,
        gold: stats.gold,
        elapsed_ms: stats.elapsed_ms,
        tally,
    };
    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{json}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GameConfig::from_toml_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))
}

fn load_script(path: &Path) -> Result<Vec<Command>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid script {}", path.display()))
}

fn replay(world: &mut World, commands: Vec<Command>) -> Tally {
    let mut tally = Tally::default();
    let mut events = Vec::new();
    for command in commands {
        events.clear();
        world::apply(world, command, &mut events);
        tally.record(&events);
    }
    tally
}

fn autoplay(world: &mut World, seed: u64, max_ticks: u64) -> Tally {
    let mut pilot = Autopilot::new(seed);
    let mut tally = Tally::default();
    let mut events = Vec::new();
    let dt = query::tick_interval(world);
    info!(seed, max_ticks, "autopilot engaged");

    for _ in 0..max_ticks {
        if query::stats(world).status.is_terminal() {
            break;
        }
        events.clear();
        for command in pilot.plan(world) {
            world::apply(world, command, &mut events);
        }
        world::apply(world, Command::Tick { dt }, &mut events);
        tally.record(&events);
    }
    tally
}

fn print_summary(summary: &Summary) {
    let tally = &summary.tally;
    println!("status        {:?}", summary.status);
    println!("wave          {}/{}", summary.wave, summary.total_waves);
    println!("lives         {}", summary.lives);
    println!("gold          {}", summary.gold);
    println!("elapsed       {:.1}s", summary.elapsed_ms as f64 / 1_000.0);
    println!("ticks         {}", tally.ticks);
    println!("waves cleared {}", tally.waves_cleared);
    println!("kills         {}", tally.kills);
    println!("leaks         {}", tally.leaks);
    println!("gold gathered {}", tally.gold_collected);
    println!("towers built  {}", tally.towers_built);
    println!("spells cast   {}", tally.spells_cast);
    println!("rejected      {}", tally.rejected);
}
