#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the gridwalk core without a renderer.
//!
//! Every subcommand loads a TOML map, then either queries the cost graph,
//! simulates the agent at a fixed frame rate, or edits terrain costs. Events
//! are reported through `tracing`; results are printed to stdout.

mod grid;

use std::{
    fs,
    path::{Path as FsPath, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use gridwalk_core::{Command, Event, GridCoord};
use gridwalk_system_autowalk::WalkSession;
use gridwalk_system_movement::{
    controls::{pointer_to_cell, HeldKeys},
    Movement,
};
use gridwalk_world::{self as world, query, World};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Simulated duration of one frame.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(
    name = "gridwalk",
    version,
    about = "Drive the gridwalk movement and pathfinding core headlessly"
)]
struct Cli {
    /// TOML map to load.
    #[arg(long, default_value = "maps/demo.toml")]
    map: PathBuf,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Print the cheapest route between two cells.
    Path {
        /// Source cell as `x,y`.
        #[arg(value_parser = parse_cell, allow_hyphen_values = true)]
        from: GridCoord,
        /// Destination cell as `x,y`.
        #[arg(value_parser = parse_cell, allow_hyphen_values = true)]
        to: GridCoord,
    },
    /// Autowalk from the spawn cell to a destination cell or clicked point.
    Walk {
        /// Destination cell as `x,y`.
        #[arg(long, value_parser = parse_cell, allow_hyphen_values = true)]
        #[arg(conflicts_with = "click", required_unless_present = "click")]
        to: Option<GridCoord>,
        /// Pointer position in screen pixels as `x,y`.
        #[arg(long, value_parser = parse_point)]
        click: Option<Vec2>,
        /// Camera scroll in world pixels as `x,y`.
        #[arg(long, value_parser = parse_point, default_value = "0,0")]
        scroll: Vec2,
        /// Halt after this many consecutive blocked steps.
        #[arg(long)]
        retry_limit: Option<u32>,
        /// Upper bound on simulated frames.
        #[arg(long, default_value_t = 10_000)]
        max_frames: u32,
    },
    /// Move from the spawn cell by held-key snapshots such as `left` or `up+right`.
    Keys {
        /// One snapshot per step, held until the step finishes.
        #[arg(value_parser = parse_keys, required = true)]
        keys: Vec<HeldKeys>,
    },
    /// Change a cell's cost and print the cost grid before and after.
    Hill {
        /// Cell to edit as `x,y`.
        #[arg(value_parser = parse_cell, allow_hyphen_values = true)]
        cell: GridCoord,
        /// Amount added to the cell's cost.
        #[arg(allow_negative_numbers = true)]
        delta: i32,
        /// Edit the cell alone without raising a hill around it.
        #[arg(long)]
        flat: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut world = load_world(&cli.map)?;
    info!(map = %cli.map.display(), "map loaded");

    match cli.action {
        Action::Path { from, to } => print_path(&world, from, to),
        Action::Walk {
            to,
            click,
            scroll,
            retry_limit,
            max_frames,
        } => {
            let target = match (to, click) {
                (Some(cell), _) => cell,
                (None, Some(pointer)) => {
                    pointer_to_cell(pointer, scroll, query::tile_size(&world))
                }
                (None, None) => anyhow::bail!("either --to or --click is required"),
            };
            autowalk(&world, target, retry_limit, max_frames);
        }
        Action::Keys { keys } => walk_keys(&world, &keys),
        Action::Hill { cell, delta, flat } => raise_hill(&mut world, cell, delta, !flat),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_world(path: &FsPath) -> Result<World> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read map file {}", path.display()))?;
    World::from_toml_str(&contents).with_context(|| format!("invalid map {}", path.display()))
}

fn print_path(world: &World, from: GridCoord, to: GridCoord) {
    let path = query::find_path(world, from, to);
    if path.is_empty() {
        warn!(from = %from, to = %to, "destination unreachable");
        println!("no route from {from} to {to}");
        return;
    }

    let cells: Vec<String> = path.cells().iter().map(GridCoord::node_key).collect();
    println!("{} steps: {}", path.len() - 1, cells.join(" -> "));
}

fn autowalk(world: &World, target: GridCoord, retry_limit: Option<u32>, max_frames: u32) {
    let mut movement = Movement::spawn(query::spawn(world), query::tile_size(world));
    let path = query::find_path(world, movement.cell(), target);
    let Some(session) = WalkSession::new(path) else {
        warn!(from = %movement.cell(), to = %target, "destination unreachable");
        println!("no route from {} to {target}", movement.cell());
        return;
    };
    let mut session = match retry_limit {
        Some(limit) => session.with_retry_limit(limit),
        None => session,
    };

    let mut events = Vec::new();
    let mut frames = 0;
    while !session.is_finished() && frames < max_frames {
        session.tick(FRAME, &mut movement, query::tile_map(world), &mut events);
        movement.advance(FRAME, &mut events);
        report(&events);
        events.clear();
        frames += 1;
    }

    let position = movement.pixel_position();
    println!(
        "agent at {} after {frames} frames ({:?}), pixel ({}, {})",
        movement.cell(),
        session.status(),
        position.x,
        position.y
    );
}

fn walk_keys(world: &World, keys: &[HeldKeys]) {
    let mut movement = Movement::spawn(query::spawn(world), query::tile_size(world));
    let mut events = Vec::new();

    for held in keys {
        let direction = held.direction();
        if movement.request_move(direction, query::tile_map(world), &mut events) {
            while movement.is_moving() {
                movement.advance(FRAME, &mut events);
            }
        }
        report(&events);
        events.clear();
    }

    println!("agent at {} facing {:?}", movement.cell(), movement.state().facing);
}

fn raise_hill(world: &mut World, cell: GridCoord, delta: i32, propagate: bool) {
    println!("before:\n{}", grid::render_costs(world));

    let mut events = Vec::new();
    world::apply(
        world,
        Command::UpdateTileCost {
            cell,
            delta,
            propagate,
        },
        &mut events,
    );
    report(&events);

    println!("after:\n{}", grid::render_costs(world));
    println!("{} cells changed", events.len());
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::AnimationChanged { .. } => debug!(?event, "animation"),
            _ => info!(?event, "event"),
        }
    }
}

fn split_pair(value: &str) -> Result<(&str, &str), String> {
    value
        .split_once(',')
        .map(|(x, y)| (x.trim(), y.trim()))
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))
}

fn parse_cell(value: &str) -> Result<GridCoord, String> {
    let (x, y) = split_pair(value)?;
    let x = x.parse().map_err(|err| format!("invalid column `{x}`: {err}"))?;
    let y = y.parse().map_err(|err| format!("invalid row `{y}`: {err}"))?;
    Ok(GridCoord::new(x, y))
}

fn parse_point(value: &str) -> Result<Vec2, String> {
    let (x, y) = split_pair(value)?;
    let x = x.parse().map_err(|err| format!("invalid x `{x}`: {err}"))?;
    let y = y.parse().map_err(|err| format!("invalid y `{y}`: {err}"))?;
    Ok(Vec2::new(x, y))
}

fn parse_keys(value: &str) -> Result<HeldKeys, String> {
    let mut held = HeldKeys::default();
    for name in value.split('+') {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => held.left = true,
            "right" => held.right = true,
            "up" => held.up = true,
            "down" => held.down = true,
            other => return Err(format!("unknown key `{other}`")),
        }
    }
    Ok(held)
}
