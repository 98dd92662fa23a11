#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Gem Cascade levels headlessly.

mod level_file;
mod render;

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use gem_cascade_core::{Command, Level, SwapMove};
use gem_cascade_world::{self as world, query, World};
use tracing_subscriber::EnvFilter;

use crate::{
    level_file::{parse_seed, parse_swap, LevelFile},
    render::TurnSummary,
};

/// Plays a Gem Cascade level from scripted swaps or hints and prints the board.
#[derive(Debug, Parser)]
#[command(name = "gem-cascade", version, about)]
struct Args {
    /// TOML level file. The default level is used when omitted.
    #[arg(short, long, value_name = "FILE")]
    level: Option<PathBuf>,

    /// Overrides the level's seed (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_seed)]
    seed: Option<u64>,

    /// Swap to request, as `row,column>row,column`. Repeatable.
    #[arg(short, long = "swap", value_name = "SWAP", value_parser = parse_swap)]
    swaps: Vec<SwapMove>,

    /// Number of hinted swaps to play after the scripted ones.
    #[arg(short, long, default_value_t = 0, value_name = "N")]
    autoplay: u32,

    /// Print the board after every swap.
    #[arg(short, long)]
    boards: bool,

    /// Log engine decisions at debug level unless RUST_LOG is set.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Gem Cascade command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    install_tracing(args.verbose);
    let stdout = std::io::stdout();
    run(&args, &mut stdout.lock())
}

fn install_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let file = match &args.level {
        Some(path) => LevelFile::load(path)?,
        None => LevelFile::default(),
    };
    let mut config = file.level.clone();
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let level = Level::new(config).context("invalid level configuration")?;

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureLevel { level }, &mut events);
    tracing::debug!(events = events.len(), "level loaded");

    writeln!(out, "{}", render::board(&world))?;
    writeln!(out, "{}", render::status(&world))?;

    let mut scripted = file.swaps()?;
    scripted.extend(args.swaps.iter().copied());

    let mut played = 0;
    for swap in scripted {
        played += 1;
        play(&mut world, swap, played, false, args.boards, out)?;
    }

    for _ in 0..args.autoplay {
        let Some(hint) = query::hint(&world) else {
            break;
        };
        played += 1;
        play(&mut world, hint, played, true, args.boards, out)?;
    }

    if !args.boards && played > 0 {
        writeln!(out, "{}", render::board(&world))?;
    }
    writeln!(out, "final: {}", render::status(&world))?;
    Ok(())
}

fn play(
    world: &mut World,
    swap: SwapMove,
    index: usize,
    hinted: bool,
    boards: bool,
    out: &mut impl Write,
) -> Result<()> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::RequestSwap {
            from: swap.from,
            to: swap.to,
        },
        &mut events,
    );

    writeln!(out, "{}", render::swap_header(index, swap, hinted))?;
    if events.is_empty() {
        writeln!(out, "  rejected")?;
    } else {
        writeln!(out, "  {}", TurnSummary::tally(&events))?;
        writeln!(out, "  {}", render::status(world))?;
    }
    if boards {
        writeln!(out, "{}", render::board(world))?;
    }
    Ok(())
}
