use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::level_gen::{Coin, Platform};
use crate::physics::Player;
use crate::session::SessionStatus;

/// Short on-screen text, visible until `expires_at_tick`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientMessage {
    pub text: String,
    pub expires_at_tick: u64,
}

impl TransientMessage {
    pub fn is_expired(&self, tick: u64) -> bool {
        tick >= self.expires_at_tick
    }
}

/// Read-only view of one tick for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub session_id: Uuid,
    pub level: u32,
    pub score: u32,
    pub coins: u32,
    pub lives: u8,
    pub status: SessionStatus,
    pub question_text: String,
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub level_coins: Vec<Coin>,
    pub message: Option<TransientMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_expires_at_deadline() {
        let m = TransientMessage {
            text: "You fell!".into(),
            expires_at_tick: 90,
        };
        assert!(!m.is_expired(89));
        assert!(m.is_expired(90));
    }

    #[test]
    fn snapshot_json_roundtrip() {
        let snap = Snapshot {
            tick: 3,
            session_id: Uuid::nil(),
            level: 1,
            score: 0,
            coins: 0,
            lives: 3,
            status: SessionStatus::Active,
            question_text: "7 - 2 × 3 = ?".into(),
            player: Player::new(50.0, 315.0),
            platforms: Vec::new(),
            level_coins: Vec::new(),
            message: None,
        };
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"question_text\":\"7 - 2 × 3 = ?\""));
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
