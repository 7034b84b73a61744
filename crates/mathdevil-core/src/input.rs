use serde::{Deserialize, Serialize};

/// Discrete input intents coming from keyboard or touch controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputIntent {
    MoveLeft,
    MoveRight,
    StopHorizontal,
    Jump,
}

/// Sticky horizontal movement state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horizontal {
    Left,
    Right,
    #[default]
    Stop,
}

/// Intent state consumed by one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatchedIntent {
    pub horizontal: Horizontal,
    pub jump: bool,
}

/// Last-writer-wins store for input intents.
///
/// Horizontal movement persists until replaced. A jump request is held until
/// the next tick consumes it; repeated jump requests between ticks collapse
/// into one. Nothing is queued or replayed.
#[derive(Debug, Clone, Default)]
pub struct IntentLatch {
    horizontal: Horizontal,
    jump: bool,
}

impl IntentLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, intent: InputIntent) {
        match intent {
            InputIntent::MoveLeft => self.horizontal = Horizontal::Left,
            InputIntent::MoveRight => self.horizontal = Horizontal::Right,
            InputIntent::StopHorizontal => self.horizontal = Horizontal::Stop,
            InputIntent::Jump => self.jump = true,
        }
    }

    /// Read the current intent, consuming any pending jump.
    pub fn take(&mut self) -> LatchedIntent {
        let latched = LatchedIntent {
            horizontal: self.horizontal,
            jump: self.jump,
        };
        self.jump = false;
        latched
    }

    pub fn clear(&mut self) {
        self.horizontal = Horizontal::Stop;
        self.jump = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_horizontal_intent_wins() {
        let mut latch = IntentLatch::new();
        latch.push(InputIntent::MoveLeft);
        latch.push(InputIntent::MoveRight);
        assert_eq!(latch.take().horizontal, Horizontal::Right);
    }

    #[test]
    fn horizontal_is_sticky_across_ticks() {
        let mut latch = IntentLatch::new();
        latch.push(InputIntent::MoveLeft);
        latch.take();
        assert_eq!(latch.take().horizontal, Horizontal::Left);
    }

    #[test]
    fn jump_is_consumed_once() {
        let mut latch = IntentLatch::new();
        latch.push(InputIntent::Jump);
        latch.push(InputIntent::Jump);
        assert!(latch.take().jump);
        assert!(!latch.take().jump, "Jump must not be replayed");
    }

    #[test]
    fn stop_overrides_movement() {
        let mut latch = IntentLatch::new();
        latch.push(InputIntent::MoveRight);
        latch.push(InputIntent::StopHorizontal);
        assert_eq!(latch.take().horizontal, Horizontal::Stop);
    }

    #[test]
    fn clear_drops_pending_state() {
        let mut latch = IntentLatch::new();
        latch.push(InputIntent::MoveRight);
        latch.push(InputIntent::Jump);
        latch.clear();
        assert_eq!(latch.take(), LatchedIntent::default());
    }
}
