use mathdevil_core::input::{Horizontal, LatchedIntent};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// The single player square. (x, y) is the top-left corner in screen space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub is_jumping: bool,
    pub facing_right: bool,
}

impl Player {
    pub fn new(spawn_x: f32, spawn_y: f32) -> Self {
        Self {
            x: spawn_x,
            y: spawn_y,
            vx: 0.0,
            vy: 0.0,
            is_jumping: false,
            facing_right: true,
        }
    }

    /// Put the player back on the spawn point with zero velocity.
    pub fn respawn(&mut self, spawn: (f32, f32)) {
        self.x = spawn.0;
        self.y = spawn.1;
        self.vx = 0.0;
        self.vy = 0.0;
        self.is_jumping = false;
    }
}

/// Position and vertical velocity after integration, before collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tentative {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
}

/// Apply one tick's latched intent to the player's velocity.
///
/// Returns `true` if a jump was requested and accepted.
pub fn apply_intent(player: &mut Player, intent: LatchedIntent, config: &EngineConfig) -> bool {
    match intent.horizontal {
        Horizontal::Left => {
            player.vx = -config.move_speed;
            player.facing_right = false;
        },
        Horizontal::Right => {
            player.vx = config.move_speed;
            player.facing_right = true;
        },
        Horizontal::Stop => player.vx = 0.0,
    }

    if intent.jump && !player.is_jumping {
        player.vy = config.jump_force;
        player.is_jumping = true;
        return true;
    }
    false
}

/// Semi-implicit Euler step: velocity first, then position.
pub fn integrate(player: &Player, config: &EngineConfig) -> Tentative {
    let vy = player.vy + config.gravity;
    let max_x = (config.canvas_width - config.player_size).max(0.0);
    let x = (player.x + player.vx).clamp(0.0, max_x);
    let y = player.y + vy;
    Tentative { x, y, vy }
}
