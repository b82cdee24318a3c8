#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the gridwalk engine.
//!
//! This crate defines the vocabulary that connects the authoritative
//! terrain world, the pure movement and autowalk systems, and the adapters
//! that drive them. Adapters submit [`Command`] values describing terrain
//! mutations, the world executes those commands via its `apply` entry point,
//! and every observable effect is reported back as [`Event`] values pushed
//! into a caller-owned buffer. Systems read the terrain exclusively through
//! the [`TerrainGrid`] trait so they never depend on the world's storage.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Side length of a square tile in pixels used when a map does not override it.
pub const DEFAULT_TILE_SIZE: u32 = 48;

/// Walking speed expressed in whole tiles per second.
pub const TILES_PER_SECOND: u32 = 3;

/// Cheapest traversal cost a passable cell may carry.
pub const MIN_COST: i32 = 1;

/// Most expensive traversal cost a passable cell may carry.
pub const MAX_COST: i32 = 20;

/// Sentinel cost marking a node as impassable for the path search.
pub const BLOCKING_COST: i32 = -1;

/// Delay between two consecutive autowalk decisions.
pub const WALK_STEP_DELAY: Duration = Duration::from_millis(100);

/// Walking speed in pixels per second for the provided tile size.
#[must_use]
pub const fn pixels_per_second(tile_size: u32) -> u32 {
    TILES_PER_SECOND * tile_size
}

/// Commands that express all permissible terrain mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Changes the traversal cost of a cell, optionally raising a hill around it.
    UpdateTileCost {
        /// Cell whose cost is edited.
        cell: GridCoord,
        /// Signed amount added to the cell's current cost before clamping.
        delta: i32,
        /// Whether the change radiates outward in Manhattan rings.
        propagate: bool,
    },
    /// Replaces the search node stored for a coordinate without touching the tiles.
    SetNode {
        /// Node inserted in place of any node at the same coordinate.
        node: CostNode,
    },
}

/// Events broadcast by the world and the systems after processing requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// An accepted move request put the agent in motion.
    MoveStarted {
        /// Cell the agent occupied when the move began.
        from: GridCoord,
        /// Direction of travel.
        direction: Direction,
    },
    /// A move request targeted a blocking or absent cell and the agent only turned.
    MoveBlocked {
        /// Cell the agent stays in.
        at: GridCoord,
        /// Direction the agent now faces.
        direction: Direction,
    },
    /// The agent snapped onto the boundary of a new cell and became idle.
    CellEntered {
        /// Cell the agent now occupies.
        cell: GridCoord,
    },
    /// The animation collaborator should display a different frame.
    AnimationChanged {
        /// Frame to display.
        frame: AnimationFrame,
    },
    /// A terrain cost write was committed to both the tile map and the cost graph.
    TileCostChanged {
        /// Cell whose cost changed.
        cell: GridCoord,
        /// Cost now stored for the cell.
        cost: i32,
    },
    /// An autowalk step was accepted by the movement system.
    WalkAdvanced {
        /// Index within the path of the cell being entered.
        index: usize,
        /// Cell being entered.
        cell: GridCoord,
    },
    /// An autowalk session consumed its whole path.
    WalkCompleted {
        /// Final cell of the path.
        destination: GridCoord,
    },
    /// An autowalk session stopped before reaching its destination.
    WalkHalted {
        /// Cell the agent occupied when the walk stopped.
        at: GridCoord,
    },
}

/// Location of a single grid cell expressed as integer column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: i32,
    y: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub const fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Coordinate displaced by the provided unit vector.
    #[must_use]
    pub const fn offset(self, vector: MovementVector) -> GridCoord {
        Self::new(self.x + vector.dx(), self.y + vector.dy())
    }

    /// Neighbouring coordinate in the provided direction, `None` for [`Direction::None`].
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<GridCoord> {
        direction.vector().map(|vector| self.offset(vector))
    }

    /// Converts a world-space pixel point into the cell that contains it.
    ///
    /// Points left of or above the origin map to negative cells, matching a
    /// floor division rather than truncation toward zero.
    #[must_use]
    pub fn from_pixel(pixel_x: f32, pixel_y: f32, tile_size: u32) -> GridCoord {
        let size = tile_size.max(1) as f32;
        Self::new(
            (pixel_x / size).floor() as i32,
            (pixel_y / size).floor() as i32,
        )
    }

    /// Canonical identity string used to recognise nodes at the same coordinate.
    #[must_use]
    pub fn node_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Cardinal movement directions plus the idle sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
    /// No movement; both the idle state and the "unresolved" result.
    #[default]
    None,
}

impl Direction {
    /// Every direction that carries a movement vector.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit displacement associated with the direction.
    ///
    /// [`Direction::None`] has no vector, so callers must handle `None`.
    #[must_use]
    pub const fn vector(self) -> Option<MovementVector> {
        match self {
            Self::Up => Some(MovementVector::UP),
            Self::Down => Some(MovementVector::DOWN),
            Self::Left => Some(MovementVector::LEFT),
            Self::Right => Some(MovementVector::RIGHT),
            Self::None => None,
        }
    }

    /// Resolves the direction of travel from one coordinate toward another.
    ///
    /// Horizontal deltas are checked before vertical ones, so a diagonal
    /// delta always resolves to a horizontal step first. Identical
    /// coordinates resolve to [`Direction::None`].
    #[must_use]
    pub const fn between(from: GridCoord, to: GridCoord) -> Direction {
        let dx = to.x() - from.x();
        let dy = to.y() - from.y();
        if dx > 0 {
            Self::Right
        } else if dx < 0 {
            Self::Left
        } else if dy > 0 {
            Self::Down
        } else if dy < 0 {
            Self::Up
        } else {
            Self::None
        }
    }

    /// Reports whether the direction is the idle sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Unit displacement between two orthogonally adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementVector {
    dx: i32,
    dy: i32,
}

impl MovementVector {
    /// One row up.
    pub const UP: MovementVector = MovementVector { dx: 0, dy: -1 };
    /// One row down.
    pub const DOWN: MovementVector = MovementVector { dx: 0, dy: 1 };
    /// One column left.
    pub const LEFT: MovementVector = MovementVector { dx: -1, dy: 0 };
    /// One column right.
    pub const RIGHT: MovementVector = MovementVector { dx: 1, dy: 0 };

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }
}

/// Search node describing the cost of entering a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostNode {
    position: GridCoord,
    cost: i32,
}

impl CostNode {
    /// Creates a node with an explicit cost.
    #[must_use]
    pub const fn new(position: GridCoord, cost: i32) -> Self {
        Self { position, cost }
    }

    /// Creates a node that removes its coordinate from the searchable set.
    #[must_use]
    pub const fn blocking(position: GridCoord) -> Self {
        Self::new(position, BLOCKING_COST)
    }

    /// Coordinate the node describes.
    #[must_use]
    pub const fn position(&self) -> GridCoord {
        self.position
    }

    /// Cost of entering the node, or [`BLOCKING_COST`].
    #[must_use]
    pub const fn cost(&self) -> i32 {
        self.cost
    }

    /// Reports whether the node is excluded from path searches.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.cost == BLOCKING_COST
    }
}

/// Strongly typed snapshot of a single terrain cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainCell {
    /// Whether the agent may enter the cell.
    pub passable: bool,
    /// Cost annotation of the ground tile, if the ground layer carries one.
    pub cost: Option<i32>,
}

/// Read-only query surface over the terrain.
///
/// Implemented by the world's tile map and by lightweight stubs in tests.
pub trait TerrainGrid {
    /// Reports whether any layer holds a tile at the coordinate.
    fn has_tile(&self, cell: GridCoord) -> bool;

    /// Reports whether the agent is unable to enter the coordinate.
    ///
    /// Cells without any tile are blocking.
    fn is_blocking(&self, cell: GridCoord) -> bool;

    /// Cost annotation of the ground tile at the coordinate.
    ///
    /// `None` means the grid has no cost data there; callers must not assume a default.
    fn cost_at(&self, cell: GridCoord) -> Option<i32>;

    /// Captures a typed snapshot of the cell, `None` when no tile exists there.
    fn snapshot(&self, cell: GridCoord) -> Option<TerrainCell> {
        if !self.has_tile(cell) {
            return None;
        }
        Some(TerrainCell {
            passable: !self.is_blocking(cell),
            cost: self.cost_at(cell),
        })
    }
}

/// Ordered cells from source (inclusive) to destination (inclusive).
///
/// An empty path signals that no route exists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    cells: Vec<GridCoord>,
}

impl Path {
    /// Wraps an ordered sequence of cells.
    #[must_use]
    pub fn from_cells(cells: Vec<GridCoord>) -> Self {
        Self { cells }
    }

    /// Path signalling that the destination is unreachable.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::default()
    }

    /// Reports whether no route was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells in the path, including both endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Cell stored at the provided index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<GridCoord> {
        self.cells.get(index).copied()
    }

    /// First cell of the path.
    #[must_use]
    pub fn source(&self) -> Option<GridCoord> {
        self.cells.first().copied()
    }

    /// Last cell of the path.
    #[must_use]
    pub fn destination(&self) -> Option<GridCoord> {
        self.cells.last().copied()
    }

    /// Borrows the ordered cells.
    #[must_use]
    pub fn cells(&self) -> &[GridCoord] {
        &self.cells
    }
}

/// Phase of the walking animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pose {
    /// Both feet planted.
    Standing,
    /// Left foot forward.
    LeftFoot,
    /// Right foot forward.
    RightFoot,
}

/// Animation frame requested from the sprite collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationFrame {
    /// Direction the sprite faces.
    pub direction: Direction,
    /// Phase of the walk cycle.
    pub pose: Pose,
}

impl AnimationFrame {
    /// Standing frame facing the provided direction.
    #[must_use]
    pub const fn standing(direction: Direction) -> Self {
        Self {
            direction,
            pose: Pose::Standing,
        }
    }
}
