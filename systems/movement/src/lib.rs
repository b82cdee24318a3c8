#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Sub-tile movement system that walks the agent between grid cells.
//!
//! The agent is either idle or moving toward a neighbouring cell. A move is
//! requested with a direction, validated against the terrain, and then
//! advanced by elapsed time at a constant pixel speed until the agent snaps
//! onto the next cell boundary. Observable effects are reported as events.

pub mod animation;
pub mod controls;

use std::time::Duration;

use glam::Vec2;
use gridwalk_core::{pixels_per_second, AnimationFrame, Direction, Event, GridCoord, TerrainGrid};
use tracing::{debug, trace};

use crate::animation::Animator;

/// Snapshot of the agent's movement bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementState {
    /// Last direction the agent turned to; drives the standing frame.
    pub facing: Direction,
    /// Direction of the move in flight, [`Direction::None`] when idle.
    pub moving: Direction,
    /// Pixels already walked from the current cell toward the next one.
    pub walked: u32,
    /// Fraction of a pixel carried over to the next tick.
    pub remainder: f64,
}

/// Movement state machine for a single agent.
#[derive(Clone, Debug)]
pub struct Movement {
    cell: GridCoord,
    tile_size: u32,
    state: MovementState,
    animator: Animator,
}

impl Movement {
    /// Spawns an idle agent in `cell`, facing down.
    #[must_use]
    pub fn spawn(cell: GridCoord, tile_size: u32) -> Self {
        Self {
            cell,
            tile_size: tile_size.max(1),
            state: MovementState {
                facing: Direction::Down,
                moving: Direction::None,
                walked: 0,
                remainder: 0.0,
            },
            animator: Animator::new(Direction::Down),
        }
    }

    /// Cell the agent currently occupies.
    ///
    /// While moving this is the cell the move started from.
    #[must_use]
    pub const fn cell(&self) -> GridCoord {
        self.cell
    }

    /// Current movement bookkeeping.
    #[must_use]
    pub const fn state(&self) -> MovementState {
        self.state
    }

    /// Reports whether a move is in flight.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        !self.state.moving.is_none()
    }

    /// Frame the sprite collaborator should display.
    #[must_use]
    pub const fn frame(&self) -> AnimationFrame {
        self.animator.frame()
    }

    /// Top-left pixel of the agent, including progress into the current move.
    #[must_use]
    pub fn pixel_position(&self) -> Vec2 {
        let tile = self.tile_size as f32;
        let mut position = Vec2::new(self.cell.x() as f32 * tile, self.cell.y() as f32 * tile);
        if let Some(vector) = self.state.moving.vector() {
            let walked = self.state.walked as f32;
            position += Vec2::new(vector.dx() as f32, vector.dy() as f32) * walked;
        }
        position
    }

    /// Requests a move one cell in `direction`.
    ///
    /// Returns `false` when a move is already in flight, when `direction` is
    /// [`Direction::None`], or when the target cell is blocking. A blocked
    /// request still turns the agent to face `direction`.
    pub fn request_move<T>(
        &mut self,
        direction: Direction,
        terrain: &T,
        out_events: &mut Vec<Event>,
    ) -> bool
    where
        T: TerrainGrid + ?Sized,
    {
        if self.is_moving() {
            return false;
        }
        let Some(target) = self.cell.step(direction) else {
            return false;
        };

        self.state.facing = direction;
        if terrain.is_blocking(target) {
            debug!(cell = %self.cell, ?direction, "move blocked");
            self.animator.stand(direction, out_events);
            out_events.push(Event::MoveBlocked {
                at: self.cell,
                direction,
            });
            return false;
        }

        debug!(cell = %self.cell, ?direction, "move started");
        self.state.moving = direction;
        out_events.push(Event::MoveStarted {
            from: self.cell,
            direction,
        });
        true
    }

    /// Advances the move in flight by `dt` of simulated time.
    pub fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let direction = self.state.moving;
        let Some(vector) = direction.vector() else {
            return;
        };

        let distance = f64::from(pixels_per_second(self.tile_size)) * dt.as_secs_f64();
        let total = distance + self.state.remainder;
        let whole = total.floor();
        self.state.remainder = total - whole;
        let pixels = whole as u32;

        if self.state.walked.saturating_add(pixels) >= self.tile_size {
            self.state.walked = self.tile_size;
            self.animate(direction, out_events);
            self.cell = self.cell.offset(vector);
            self.state.walked = 0;
            self.state.moving = Direction::None;
            trace!(cell = %self.cell, "cell boundary reached");
            out_events.push(Event::CellEntered { cell: self.cell });
            return;
        }

        if pixels == 0 {
            return;
        }
        self.state.walked += pixels;
        trace!(walked = self.state.walked, "agent moved");
        self.animate(direction, out_events);
    }

    fn animate(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.state.walked * 2 > self.tile_size {
            self.animator.stand(direction, out_events);
        } else {
            self.animator.walk(direction, out_events);
        }
    }
}
