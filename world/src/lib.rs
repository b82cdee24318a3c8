#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative terrain state management for gridwalk.
//!
//! The world owns the layered tile map and the cost graph that mirrors it.
//! Every terrain cost write flows through [`apply`], which keeps the two in
//! lockstep, while the [`query`] module exposes read-only access for systems
//! and adapters.

pub mod error;
pub mod map;
pub mod pathfinder;
pub mod tilemap;

mod hill;

use gridwalk_core::{Command, Event, GridCoord};

pub use error::MapError;
pub use map::{LoadedMap, MapDefinition};
pub use pathfinder::CostGraph;
pub use tilemap::TileMap;

/// Represents the authoritative gridwalk terrain.
#[derive(Debug)]
pub struct World {
    tile_map: TileMap,
    cost_graph: CostGraph,
    spawn: GridCoord,
}

impl World {
    /// Creates a world over the provided terrain, building its cost graph.
    pub fn new(tile_map: TileMap, spawn: GridCoord) -> Result<Self, MapError> {
        if !tile_map.contains(spawn) {
            return Err(MapError::SpawnOutOfBounds {
                x: spawn.x(),
                y: spawn.y(),
            });
        }
        let cost_graph = CostGraph::from_terrain(&tile_map, tile_map.width(), tile_map.height());
        Ok(Self {
            tile_map,
            cost_graph,
            spawn,
        })
    }

    /// Validates a map definition and creates a world from it.
    pub fn from_definition(definition: MapDefinition) -> Result<Self, MapError> {
        let LoadedMap { tile_map, spawn } = definition.build()?;
        Self::new(tile_map, spawn)
    }

    /// Parses a TOML map document and creates a world from it.
    pub fn from_toml_str(contents: &str) -> Result<Self, MapError> {
        Self::from_definition(MapDefinition::parse(contents)?)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::UpdateTileCost {
            cell,
            delta,
            propagate,
        } => hill::update_tile_cost(
            &mut world.tile_map,
            &mut world.cost_graph,
            cell,
            delta,
            propagate,
            out_events,
        ),
        Command::SetNode { node } => world.cost_graph.upsert_node(node),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gridwalk_core::{CostNode, GridCoord, Path, TerrainGrid};

    use super::{CostGraph, TileMap, World};

    /// Terrain surface used for blocking and cost lookups.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.tile_map
    }

    /// Search graph mirroring the terrain costs.
    #[must_use]
    pub fn cost_graph(world: &World) -> &CostGraph {
        &world.cost_graph
    }

    /// Cell the agent spawns in.
    #[must_use]
    pub fn spawn(world: &World) -> GridCoord {
        world.spawn
    }

    /// Side length of a tile in pixels.
    #[must_use]
    pub fn tile_size(world: &World) -> u32 {
        world.tile_map.tile_size()
    }

    /// Cost annotation of the ground tile at the coordinate.
    #[must_use]
    pub fn cost_at(world: &World, cell: GridCoord) -> Option<i32> {
        world.tile_map.cost_at(cell)
    }

    /// Search node stored for the coordinate.
    #[must_use]
    pub fn node(world: &World, cell: GridCoord) -> Option<CostNode> {
        world.cost_graph.node(cell)
    }

    /// Cheapest route between two coordinates; empty when unreachable.
    #[must_use]
    pub fn find_path(world: &World, from: GridCoord, to: GridCoord) -> Path {
        world.cost_graph.find_path(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwalk_core::{CostNode, TerrainGrid};

    const WALLED_MAP: &str = r##"
        version = 1
        width = 5
        height = 3
        spawn = [0, 1]

        [tileset]
        cost_ramp = { first_index = 1, max_cost = 20 }
        tiles = [{ index = 40, collides = true }]

        [[layers]]
        name = "Ground"
        rows = ["ggggg", "ggggg", "ggggg"]
        legend = { g = 1 }

        [[layers]]
        name = "Walls"
        rows = ["..#..", "..#..", "....."]
        legend = { "#" = 40 }
    "##;

    fn walled_world() -> World {
        World::from_toml_str(WALLED_MAP).expect("map should load")
    }

    #[test]
    fn colliding_cells_become_blocking_nodes() {
        let world = walled_world();
        let wall = GridCoord::new(2, 0);
        assert!(query::tile_map(&world).is_blocking(wall));
        assert!(query::node(&world, wall).is_some_and(|node| node.is_blocking()));
        assert_eq!(query::node(&world, GridCoord::new(0, 0)).map(|n| n.cost()), Some(1));
    }

    #[test]
    fn path_detours_through_the_wall_gap() {
        let world = walled_world();
        let path = query::find_path(&world, GridCoord::new(0, 1), GridCoord::new(4, 1));
        assert!(path.cells().contains(&GridCoord::new(2, 2)));
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn cost_update_keeps_terrain_and_graph_in_sync() {
        let mut world = walled_world();
        let mut events = Vec::new();
        let cell = GridCoord::new(3, 2);

        apply(
            &mut world,
            Command::UpdateTileCost {
                cell,
                delta: 4,
                propagate: false,
            },
            &mut events,
        );

        assert_eq!(query::cost_at(&world, cell), Some(5));
        assert_eq!(query::node(&world, cell).map(|node| node.cost()), Some(5));
        assert_eq!(events, vec![Event::TileCostChanged { cell, cost: 5 }]);
    }

    #[test]
    fn cost_update_under_a_wall_keeps_the_node_blocking() {
        let mut world = walled_world();
        let mut events = Vec::new();
        let wall = GridCoord::new(2, 1);

        apply(
            &mut world,
            Command::UpdateTileCost {
                cell: wall,
                delta: 2,
                propagate: false,
            },
            &mut events,
        );

        assert_eq!(query::cost_at(&world, wall), Some(3));
        assert!(query::node(&world, wall).is_some_and(|node| node.is_blocking()));
    }

    #[test]
    fn set_node_closes_the_gap() {
        let mut world = walled_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetNode {
                node: CostNode::blocking(GridCoord::new(2, 2)),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::find_path(&world, GridCoord::new(0, 1), GridCoord::new(4, 1)).is_empty());
    }

    #[test]
    fn spawn_must_lie_inside_the_map() {
        let contents = WALLED_MAP.replace("spawn = [0, 1]", "spawn = [0, 3]");
        assert!(matches!(
            World::from_toml_str(&contents),
            Err(MapError::SpawnOutOfBounds { x: 0, y: 3 })
        ));
    }
}
