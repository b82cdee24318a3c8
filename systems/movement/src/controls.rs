//! Translation of raw input snapshots into movement intents.

use glam::Vec2;
use gridwalk_core::{Direction, GridCoord};

/// Arrow keys held down during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    /// Left arrow held.
    pub left: bool,
    /// Right arrow held.
    pub right: bool,
    /// Up arrow held.
    pub up: bool,
    /// Down arrow held.
    pub down: bool,
}

impl HeldKeys {
    /// Resolves the held keys to a single direction.
    ///
    /// Left wins over right, right over up, up over down.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        if self.left {
            Direction::Left
        } else if self.right {
            Direction::Right
        } else if self.up {
            Direction::Up
        } else if self.down {
            Direction::Down
        } else {
            Direction::None
        }
    }
}

/// Converts a pointer position on screen into the grid cell under it.
///
/// `camera_scroll` is the world-space offset of the viewport's top-left corner.
#[must_use]
pub fn pointer_to_cell(pointer: Vec2, camera_scroll: Vec2, tile_size: u32) -> GridCoord {
    let world = pointer + camera_scroll;
    GridCoord::from_pixel(world.x, world.y, tile_size)
}
