use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::input::InputIntent;
use crate::protocol::ProtocolError;

/// Core trait the runner drives.
///
/// The runner owns scheduling, command intake, and broadcast; the game only
/// handles simulation. Every method is called from the single task that owns
/// the game, so implementations never need interior locking.
pub trait MathDevilGame: Send {
    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Record an input intent for the next tick (last writer wins).
    fn apply_intent(&mut self, intent: InputIntent);

    /// Advance one fixed timestep. Returns the events resolved during the tick.
    fn update(&mut self) -> Vec<GameEvent>;

    /// Encode the current read-only snapshot for the presentation layer.
    fn serialize_snapshot(&self) -> Result<Vec<u8>, ProtocolError>;

    /// Start a fresh session (level 1, full lives, zero score).
    fn reset(&mut self);

    /// Cancel every pending timer. Called once when the runner tears down.
    fn shutdown(&mut self);

    /// Whether the current session has reached its terminal state.
    fn is_game_over(&self) -> bool;

    /// Final (or current) session totals.
    fn result(&self) -> GameResult;
}

/// Why a life was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardCause {
    Spike,
    WrongAnswer,
    Fall,
}

/// Events emitted by a game during update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Landed { platform: usize },
    CorrectAnswer { points: u32 },
    CoinCollected { coin: usize },
    FakePlatform { platform: usize },
    LifeLost { cause: HazardCause, lives_left: u8 },
    PlatformVanished { platform: usize },
    LevelCleared { level: u32, bonus: u32 },
    GameOver(GameResult),
}

/// Session totals handed to the completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub session_id: Uuid,
    pub level: u32,
    pub score: u32,
    pub coins: u32,
}
