#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autowalk system that steers the movement system along a precomputed path.
//!
//! A [`WalkSession`] owns the path and the index of the next cell to enter.
//! Every [`WALK_STEP_DELAY`] of simulated time it asks the movement system to
//! step toward that cell. Rejected steps are retried on the next decision, so
//! the session never aborts just because the agent was still mid-move.
//! Dropping or replacing the session cancels the walk.

use std::time::Duration;

use gridwalk_core::{Direction, Event, GridCoord, Path, TerrainGrid, WALK_STEP_DELAY};
use gridwalk_system_movement::Movement;
use tracing::{debug, warn};

/// Lifecycle of a walk session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStatus {
    /// The session still has cells to enter.
    Walking,
    /// Every cell of the path was entered.
    Completed,
    /// The session stopped early.
    Halted,
}

/// Follows a single path one cell at a time.
#[derive(Clone, Debug)]
pub struct WalkSession {
    path: Path,
    index: usize,
    elapsed: Duration,
    retry_limit: Option<u32>,
    rejected: u32,
    status: WalkStatus,
}

impl WalkSession {
    /// Starts a session over `path`, or `None` when the path is empty.
    ///
    /// The first step is attempted on the first tick. Rejected steps are
    /// retried for as long as the session lives.
    #[must_use]
    pub fn new(path: Path) -> Option<Self> {
        if path.is_empty() {
            return None;
        }
        Some(Self {
            path,
            index: 1,
            elapsed: WALK_STEP_DELAY,
            retry_limit: None,
            rejected: 0,
            status: WalkStatus::Walking,
        })
    }

    /// Halts the walk after `limit` consecutive blocked steps.
    #[must_use]
    pub fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = Some(limit);
        self
    }

    /// Index of the next cell to enter.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Final cell of the path.
    #[must_use]
    pub fn destination(&self) -> Option<GridCoord> {
        self.path.destination()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> WalkStatus {
        self.status
    }

    /// Reports whether the session stopped, either by completing or halting.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status != WalkStatus::Walking
    }

    /// Advances the session clock by `dt` and takes a decision when it is due.
    ///
    /// Call this once per frame before advancing `movement`.
    pub fn tick<T>(
        &mut self,
        dt: Duration,
        movement: &mut Movement,
        terrain: &T,
        out_events: &mut Vec<Event>,
    ) where
        T: TerrainGrid + ?Sized,
    {
        if self.is_finished() {
            return;
        }

        if self.index >= self.path.len() {
            if !movement.is_moving() {
                self.complete(out_events);
            }
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < WALK_STEP_DELAY {
            return;
        }
        // Carry the overshoot, but never bank more than one extra decision.
        self.elapsed = (self.elapsed - WALK_STEP_DELAY).min(WALK_STEP_DELAY);
        self.step(movement, terrain, out_events);
    }

    fn step<T>(&mut self, movement: &mut Movement, terrain: &T, out_events: &mut Vec<Event>)
    where
        T: TerrainGrid + ?Sized,
    {
        let Some(next) = self.path.get(self.index) else {
            return;
        };
        if movement.is_moving() {
            return;
        }

        let direction = Direction::between(movement.cell(), next);
        if direction.is_none() {
            warn!(cell = %next, index = self.index, "path repeats the current cell");
            self.halt(movement.cell(), out_events);
            return;
        }

        if movement.request_move(direction, terrain, out_events) {
            out_events.push(Event::WalkAdvanced {
                index: self.index,
                cell: next,
            });
            self.index += 1;
            self.rejected = 0;
            return;
        }

        self.rejected = self.rejected.saturating_add(1);
        debug!(cell = %next, attempts = self.rejected, "walk step rejected");
        if self.retry_limit.is_some_and(|limit| self.rejected >= limit) {
            self.halt(movement.cell(), out_events);
        }
    }

    fn complete(&mut self, out_events: &mut Vec<Event>) {
        self.status = WalkStatus::Completed;
        if let Some(destination) = self.path.destination() {
            debug!(destination = %destination, "walk completed");
            out_events.push(Event::WalkCompleted { destination });
        }
    }

    fn halt(&mut self, at: GridCoord, out_events: &mut Vec<Event>) {
        debug!(at = %at, index = self.index, "walk halted");
        self.status = WalkStatus::Halted;
        out_events.push(Event::WalkHalted { at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat;

    impl TerrainGrid for Flat {
        fn has_tile(&self, _cell: GridCoord) -> bool {
            true
        }

        fn is_blocking(&self, _cell: GridCoord) -> bool {
            false
        }

        fn cost_at(&self, _cell: GridCoord) -> Option<i32> {
            Some(1)
        }
    }

    #[test]
    fn empty_path_starts_no_session() {
        assert!(WalkSession::new(Path::unreachable()).is_none());
    }

    #[test]
    fn single_cell_path_completes_immediately() {
        let cell = GridCoord::new(2, 2);
        let mut session = WalkSession::new(Path::from_cells(vec![cell])).expect("session");
        let mut movement = Movement::spawn(cell, 48);
        let mut events = Vec::new();

        session.tick(Duration::from_millis(16), &mut movement, &Flat, &mut events);

        assert_eq!(session.status(), WalkStatus::Completed);
        assert_eq!(events, vec![Event::WalkCompleted { destination: cell }]);
    }

    #[test]
    fn first_decision_fires_without_delay() {
        let path = Path::from_cells(vec![GridCoord::new(0, 0), GridCoord::new(0, 1)]);
        let mut session = WalkSession::new(path).expect("session");
        let mut movement = Movement::spawn(GridCoord::new(0, 0), 48);
        let mut events = Vec::new();

        session.tick(Duration::ZERO, &mut movement, &Flat, &mut events);

        assert!(movement.is_moving());
        assert_eq!(session.index(), 2);
        assert!(events.contains(&Event::WalkAdvanced {
            index: 1,
            cell: GridCoord::new(0, 1)
        }));
    }

    #[test]
    fn repeated_cell_halts_the_walk() {
        let start = GridCoord::new(1, 1);
        let path = Path::from_cells(vec![start, start, GridCoord::new(2, 1)]);
        let mut session = WalkSession::new(path).expect("session");
        let mut movement = Movement::spawn(start, 48);
        let mut events = Vec::new();

        session.tick(Duration::from_millis(16), &mut movement, &Flat, &mut events);

        assert_eq!(session.status(), WalkStatus::Halted);
        assert_eq!(events, vec![Event::WalkHalted { at: start }]);
        assert!(!movement.is_moving());
    }
}
