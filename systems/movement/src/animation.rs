//! Walk-cycle bookkeeping for the sprite collaborator.

use gridwalk_core::{AnimationFrame, Direction, Event, Pose};

/// Tracks the displayed frame and which foot leads the next step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Animator {
    frame: AnimationFrame,
    last_foot_left: bool,
}

impl Animator {
    /// Starts on the standing frame for `facing`.
    #[must_use]
    pub const fn new(facing: Direction) -> Self {
        Self {
            frame: AnimationFrame::standing(facing),
            last_foot_left: false,
        }
    }

    /// Frame currently displayed.
    #[must_use]
    pub const fn frame(&self) -> AnimationFrame {
        self.frame
    }

    /// Switches to the standing frame for `direction`.
    ///
    /// Entering the standing pose flips the leading foot so consecutive
    /// steps alternate between left and right.
    pub fn stand(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let standing = AnimationFrame::standing(direction);
        if self.frame != standing {
            self.last_foot_left = !self.last_foot_left;
        }
        self.show(standing, out_events);
    }

    /// Switches to the walking frame for `direction`.
    pub fn walk(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let pose = if self.last_foot_left {
            Pose::RightFoot
        } else {
            Pose::LeftFoot
        };
        self.show(AnimationFrame { direction, pose }, out_events);
    }

    fn show(&mut self, frame: AnimationFrame, out_events: &mut Vec<Event>) {
        if self.frame == frame {
            return;
        }
        self.frame = frame;
        out_events.push(Event::AnimationChanged { frame });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_steps_alternate_feet() {
        let mut animator = Animator::new(Direction::Down);
        let mut events = Vec::new();

        animator.walk(Direction::Right, &mut events);
        assert_eq!(animator.frame().pose, Pose::LeftFoot);
        animator.stand(Direction::Right, &mut events);
        animator.walk(Direction::Right, &mut events);
        assert_eq!(animator.frame().pose, Pose::RightFoot);
        animator.stand(Direction::Right, &mut events);
        animator.walk(Direction::Right, &mut events);
        assert_eq!(animator.frame().pose, Pose::LeftFoot);
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn repeated_standing_does_not_flip_the_foot() {
        let mut animator = Animator::new(Direction::Up);
        let mut events = Vec::new();

        animator.stand(Direction::Up, &mut events);
        animator.stand(Direction::Up, &mut events);
        animator.walk(Direction::Up, &mut events);

        assert_eq!(events.len(), 1);
        assert_eq!(animator.frame().pose, Pose::LeftFoot);
    }
}
