use serde::{Deserialize, Serialize};

/// Points per level for landing on the troll answer.
pub const CORRECT_ANSWER_POINTS: u32 = 300;
/// Points per cleared level, paid on reaching the exit.
pub const LEVEL_CLEAR_POINTS: u32 = 150;
/// Score awarded per coin.
pub const COIN_SCORE: u32 = 50;
/// Coin counter increment per coin.
pub const COIN_VALUE: u32 = 10;

/// Reward for landing on the correct platform of `level`.
pub fn correct_answer_points(level: u32) -> u32 {
    CORRECT_ANSWER_POINTS.saturating_mul(level)
}

/// Bonus for clearing `level` (the level being left, not the one entered).
pub fn level_clear_bonus(level: u32) -> u32 {
    LEVEL_CLEAR_POINTS.saturating_mul(level)
}

/// Per-level latch so the correct-answer reward is paid once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringGuard {
    awarded: bool,
}

impl ScoringGuard {
    /// Points to award for a correct landing, or `None` if already paid this level.
    pub fn try_award(&mut self, level: u32) -> Option<u32> {
        if self.awarded {
            return None;
        }
        self.awarded = true;
        Some(correct_answer_points(level))
    }

    pub fn is_awarded(&self) -> bool {
        self.awarded
    }

    pub fn reset(&mut self) {
        self.awarded = false;
    }
}
