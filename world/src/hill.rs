//! Terrain cost edits and the radial "hill" they may raise.

use gridwalk_core::{Event, GridCoord, TerrainGrid, MAX_COST, MIN_COST};
use tracing::{debug, warn};

use crate::{pathfinder::CostGraph, tilemap::TileMap};

/// Changes the cost of `cell` by `delta` and optionally raises a hill around it.
///
/// Each cost write places the matching tile template on the ground layer and
/// immediately upserts the node derived from the new terrain into the graph,
/// so the two never disagree between calls. Missing tiles or templates are
/// logged and leave the terrain untouched.
pub(crate) fn update_tile_cost(
    tile_map: &mut TileMap,
    graph: &mut CostGraph,
    cell: GridCoord,
    delta: i32,
    propagate: bool,
    out_events: &mut Vec<Event>,
) {
    let Some(old_cost) = tile_map.cost_at(cell) else {
        warn!(cell = %cell, "tile not found; cost update skipped");
        return;
    };

    let new_cost = old_cost.saturating_add(delta).clamp(MIN_COST, MAX_COST);
    if !commit_cost(tile_map, graph, cell, new_cost, out_events) {
        return;
    }

    if propagate {
        raise_hill(tile_map, graph, cell, new_cost, out_events);
    }
}

fn commit_cost(
    tile_map: &mut TileMap,
    graph: &mut CostGraph,
    cell: GridCoord,
    cost: i32,
    out_events: &mut Vec<Event>,
) -> bool {
    let Some(template) = tile_map.tileset().template_with_cost(cost) else {
        warn!(cell = %cell, cost, "no tile template carries the requested cost");
        return false;
    };
    if !tile_map.place_ground_tile(cell, template) {
        warn!(cell = %cell, "tile not found; cost update skipped");
        return false;
    }

    graph.upsert_node(CostGraph::create_node(cell, tile_map.snapshot(cell)));
    out_events.push(Event::TileCostChanged { cell, cost });
    true
}

/// Raises every ring around `peak` up to `peak_cost - ring`.
///
/// All increments are decided from the costs as they stood before the
/// hill is applied; ring cells are edited without further propagation.
fn raise_hill(
    tile_map: &mut TileMap,
    graph: &mut CostGraph,
    peak: GridCoord,
    peak_cost: i32,
    out_events: &mut Vec<Event>,
) {
    let mut scheduled: Vec<(GridCoord, i32)> = Vec::new();

    for ring in 1.. {
        let target = peak_cost - ring;
        if target <= 0 {
            break;
        }
        let radius = u32::try_from(ring).unwrap_or(0);
        for cell in ring_cells(peak, radius) {
            if tile_map.ground_tile(cell).is_none() {
                warn!(cell = %cell, "ring cell has no ground tile; skipped");
                continue;
            }
            let Some(current) = tile_map.cost_at(cell) else {
                warn!(cell = %cell, "ring cell has no cost; skipped");
                continue;
            };
            let increment = target - current;
            if increment > 0 {
                scheduled.push((cell, increment));
            }
        }
    }

    debug!(peak = %peak, peak_cost, cells = scheduled.len(), "raising hill");
    for (cell, increment) in scheduled {
        update_tile_cost(tile_map, graph, cell, increment, false, out_events);
    }
}

/// Cells at exactly Manhattan distance `radius` from `center`.
pub(crate) fn ring_cells(center: GridCoord, radius: u32) -> Vec<GridCoord> {
    if radius == 0 {
        return vec![center];
    }
    let Ok(radius) = i32::try_from(radius) else {
        return Vec::new();
    };

    let mut cells = Vec::with_capacity(usize::try_from(radius).unwrap_or(0) * 4);
    for dx in -radius..=radius {
        let dy = radius - dx.abs();
        cells.push(GridCoord::new(center.x() + dx, center.y() - dy));
        if dy != 0 {
            cells.push(GridCoord::new(center.x() + dx, center.y() + dy));
        }
    }
    cells
}
