use mathdevil_core::game_trait::GameResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::{COIN_SCORE, COIN_VALUE, ScoringGuard, level_clear_bonus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    GameOver,
}

/// Totals for one play-through, from reset to game over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub session_id: Uuid,
    pub level: u32,
    pub score: u32,
    pub coins: u32,
    pub lives: u8,
    pub status: SessionStatus,
    pub scoring_guard: ScoringGuard,
    completion_reported: bool,
}

impl GameSession {
    pub fn new(session_id: Uuid, starting_lives: u8) -> Self {
        Self {
            session_id,
            level: 1,
            score: 0,
            coins: 0,
            lives: starting_lives.max(1),
            status: SessionStatus::Active,
            scoring_guard: ScoringGuard::default(),
            completion_reported: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Pay the correct-answer reward if the guard allows it.
    pub fn award_correct(&mut self) -> Option<u32> {
        let points = self.scoring_guard.try_award(self.level)?;
        self.score = self.score.saturating_add(points);
        Some(points)
    }

    pub fn collect_coin(&mut self) {
        self.score = self.score.saturating_add(COIN_SCORE);
        self.coins = self.coins.saturating_add(COIN_VALUE);
    }

    /// Take one life. Returns the lives left; at zero the session is over.
    pub fn lose_life(&mut self) -> u8 {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.status = SessionStatus::GameOver;
        }
        self.lives
    }

    /// Move to the next level, paying the clear bonus for the level just left.
    /// Returns the bonus.
    pub fn advance_level(&mut self) -> u32 {
        let bonus = level_clear_bonus(self.level);
        self.score = self.score.saturating_add(bonus);
        self.level += 1;
        self.scoring_guard.reset();
        bonus
    }

    pub fn result(&self) -> GameResult {
        GameResult {
            session_id: self.session_id,
            level: self.level,
            score: self.score,
            coins: self.coins,
        }
    }

    /// The final result, handed out at most once per session and only after
    /// game over.
    pub fn take_completion(&mut self) -> Option<GameResult> {
        if self.status != SessionStatus::GameOver || self.completion_reported {
            return None;
        }
        self.completion_reported = true;
        Some(self.result())
    }
}
