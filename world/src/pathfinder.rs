//! Cost graph and the informed search that answers path queries.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
    hash::Hash,
};

use gridwalk_core::{
    CostNode, GridCoord, Path, TerrainCell, TerrainGrid, BLOCKING_COST, MAX_COST, MIN_COST,
};
use tracing::{debug, warn};

/// Graph abstraction consumed by [`find_route`].
///
/// Implementors decide which nodes exist, how much entering a node costs and
/// how far a node is estimated to be from the goal. The estimate must never
/// exceed the true remaining cost for the search to return optimal routes.
pub trait SearchSpace {
    /// Node identity. Two equal values always denote the same node.
    type Node: Copy + Eq + Hash;

    /// Reports whether the node may appear on a route at all.
    fn is_searchable(&self, node: Self::Node) -> bool;

    /// Appends the nodes adjacent to `node` into `out`.
    fn neighbors(&self, node: Self::Node, out: &mut Vec<Self::Node>);

    /// Cost of moving from `from` into `to`, `None` when `to` cannot be entered.
    fn movement_cost(&self, from: Self::Node, to: Self::Node) -> Option<u32>;

    /// Admissible estimate of the remaining cost between two nodes.
    fn heuristic(&self, from: Self::Node, to: Self::Node) -> u32;
}

#[derive(Debug)]
struct Frontier<N> {
    priority: u32,
    sequence: u64,
    node: N,
}

impl<N> PartialEq for Frontier<N> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl<N> Eq for Frontier<N> {}

impl<N> PartialOrd for Frontier<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> Ord for Frontier<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the cheapest, oldest entry first.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Runs an A* search from `from` to `to`.
///
/// Returns the ordered nodes including both endpoints, or `None` when either
/// endpoint is not searchable or no route connects them.
pub fn find_route<S>(space: &S, from: S::Node, to: S::Node) -> Option<Vec<S::Node>>
where
    S: SearchSpace + ?Sized,
{
    if !space.is_searchable(from) || !space.is_searchable(to) {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }

    let mut open = BinaryHeap::new();
    let mut best_cost: HashMap<S::Node, u32> = HashMap::new();
    let mut came_from: HashMap<S::Node, S::Node> = HashMap::new();
    let mut closed: HashSet<S::Node> = HashSet::new();
    let mut neighbors = Vec::with_capacity(4);
    let mut sequence = 0_u64;

    let _ = best_cost.insert(from, 0);
    open.push(Frontier {
        priority: space.heuristic(from, to),
        sequence,
        node: from,
    });

    while let Some(Frontier { node, .. }) = open.pop() {
        if node == to {
            return Some(reconstruct(&came_from, from, to));
        }
        if !closed.insert(node) {
            continue;
        }

        let Some(&cost_so_far) = best_cost.get(&node) else {
            continue;
        };

        neighbors.clear();
        space.neighbors(node, &mut neighbors);
        for &neighbor in &neighbors {
            if closed.contains(&neighbor) || !space.is_searchable(neighbor) {
                continue;
            }
            let Some(step) = space.movement_cost(node, neighbor) else {
                continue;
            };

            let tentative = cost_so_far.saturating_add(step);
            if best_cost
                .get(&neighbor)
                .is_some_and(|&known| known <= tentative)
            {
                continue;
            }

            let _ = best_cost.insert(neighbor, tentative);
            let _ = came_from.insert(neighbor, node);
            sequence += 1;
            open.push(Frontier {
                priority: tentative.saturating_add(space.heuristic(neighbor, to)),
                sequence,
                node: neighbor,
            });
        }
    }

    None
}

fn reconstruct<N>(came_from: &HashMap<N, N>, from: N, to: N) -> Vec<N>
where
    N: Copy + Eq + Hash,
{
    let mut route = vec![to];
    let mut current = to;
    while current != from {
        let Some(&previous) = came_from.get(&current) else {
            break;
        };
        route.push(previous);
        current = previous;
    }
    route.reverse();
    route
}

/// Mutable set of cost nodes, at most one per coordinate, over a bounded grid.
#[derive(Clone, Debug, Default)]
pub struct CostGraph {
    width: u32,
    height: u32,
    nodes: HashMap<GridCoord, CostNode>,
}

impl CostGraph {
    /// Creates an empty graph over a `width` by `height` grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            nodes: HashMap::new(),
        }
    }

    /// Builds a graph holding one node per in-bounds cell of the terrain.
    #[must_use]
    pub fn from_terrain<T>(terrain: &T, width: u32, height: u32) -> Self
    where
        T: TerrainGrid + ?Sized,
    {
        let mut graph = Self::new(width, height);
        let columns = i32::try_from(width).unwrap_or(i32::MAX);
        let rows = i32::try_from(height).unwrap_or(i32::MAX);
        for y in 0..rows {
            for x in 0..columns {
                let cell = GridCoord::new(x, y);
                let node = normalize(Self::create_node(cell, terrain.snapshot(cell)));
                let _ = graph.nodes.insert(cell, node);
            }
        }
        graph
    }

    /// Derives the node for a terrain snapshot.
    ///
    /// Blocking cells, absent cells and cells without cost data all become
    /// blocking nodes.
    #[must_use]
    pub fn create_node(position: GridCoord, snapshot: Option<TerrainCell>) -> CostNode {
        match snapshot {
            Some(TerrainCell {
                passable: true,
                cost: Some(cost),
            }) => CostNode::new(position, cost),
            _ => CostNode::blocking(position),
        }
    }

    /// Replaces any node stored at the same coordinate with `node`.
    ///
    /// Nodes outside the grid bounds are ignored. Costs below [`MIN_COST`]
    /// are stored as blocking and costs above [`MAX_COST`] are clamped.
    pub fn upsert_node(&mut self, node: CostNode) {
        let position = node.position();
        if !self.in_bounds(position) {
            warn!(node = %position.node_key(), "ignoring node outside the cost graph");
            return;
        }
        let node = normalize(node);
        let _ = self.nodes.remove(&position);
        let _ = self.nodes.insert(position, node);
        debug!(node = %position.node_key(), cost = node.cost(), "cost node updated");
    }

    /// Node stored at the coordinate.
    #[must_use]
    pub fn node(&self, position: GridCoord) -> Option<CostNode> {
        self.nodes.get(&position).copied()
    }

    /// Number of stored nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reports whether the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Cheapest route between two coordinates; empty when unreachable.
    #[must_use]
    pub fn find_path(&self, from: GridCoord, to: GridCoord) -> Path {
        match find_route(self, from, to) {
            Some(cells) => {
                debug!(from = %from, to = %to, length = cells.len(), "path found");
                Path::from_cells(cells)
            }
            None => {
                debug!(from = %from, to = %to, "no path found");
                Path::unreachable()
            }
        }
    }

    fn in_bounds(&self, cell: GridCoord) -> bool {
        u32::try_from(cell.x()).is_ok_and(|x| x < self.width)
            && u32::try_from(cell.y()).is_ok_and(|y| y < self.height)
    }
}

/// Brings a node's cost into `MIN_COST..=MAX_COST` or marks it blocking.
fn normalize(node: CostNode) -> CostNode {
    let cost = node.cost();
    if cost < MIN_COST {
        if cost != BLOCKING_COST {
            warn!(
                node = %node.position().node_key(),
                cost,
                "cost below minimum stored as blocking"
            );
        }
        return CostNode::blocking(node.position());
    }
    if cost > MAX_COST {
        warn!(node = %node.position().node_key(), cost, "cost above maximum clamped");
        return CostNode::new(node.position(), MAX_COST);
    }
    node
}

/// Cost of entering a stored node, `None` when it cannot be entered.
fn entry_cost(node: &CostNode) -> Option<u32> {
    if node.is_blocking() || node.cost() < MIN_COST {
        return None;
    }
    u32::try_from(node.cost()).ok()
}

impl SearchSpace for CostGraph {
    type Node = GridCoord;

    fn is_searchable(&self, node: GridCoord) -> bool {
        self.nodes.get(&node).and_then(entry_cost).is_some()
    }

    fn neighbors(&self, node: GridCoord, out: &mut Vec<GridCoord>) {
        let candidates = [
            GridCoord::new(node.x() - 1, node.y()),
            GridCoord::new(node.x(), node.y() - 1),
            GridCoord::new(node.x() + 1, node.y()),
            GridCoord::new(node.x(), node.y() + 1),
        ];
        out.extend(candidates.into_iter().filter(|cell| self.in_bounds(*cell)));
    }

    fn movement_cost(&self, _from: GridCoord, to: GridCoord) -> Option<u32> {
        self.nodes.get(&to).and_then(entry_cost)
    }

    fn heuristic(&self, from: GridCoord, to: GridCoord) -> u32 {
        from.manhattan_distance(to)
    }
}
