use serde::{Deserialize, Serialize};

/// Default canvas width in pixels.
pub const CANVAS_WIDTH: f32 = 400.0;
/// Default canvas height in pixels (y grows downward).
pub const CANVAS_HEIGHT: f32 = 450.0;
/// Player square edge length.
pub const PLAYER_SIZE: f32 = 20.0;
/// Downward acceleration per tick.
pub const GRAVITY: f32 = 0.5;
/// Vertical velocity applied on jump (negative is up).
pub const JUMP_FORCE: f32 = -12.0;
/// Horizontal speed per tick while a move intent is held.
pub const MOVE_SPEED: f32 = 5.0;
/// Extra depth below a platform's bottom edge that still counts as a landing.
pub const LANDING_TOLERANCE: f32 = 12.0;
/// Per-axis distance between player centre and coin centre for a pickup.
pub const COIN_PICKUP_RADIUS: f32 = 20.0;
/// Fixed simulation rate.
pub const TICK_RATE_HZ: f32 = 60.0;
/// How long a transient message stays visible (1.5 s at 60 Hz).
pub const MESSAGE_TICKS: u64 = 90;
/// Lives at the start of a session.
pub const STARTING_LIVES: u8 = 3;

/// Data-driven engine configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub player_size: f32,
    pub gravity: f32,
    pub jump_force: f32,
    pub move_speed: f32,
    pub landing_tolerance: f32,
    pub coin_pickup_radius: f32,
    pub tick_rate_hz: f32,
    pub message_ticks: u64,
    pub starting_lives: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            player_size: PLAYER_SIZE,
            gravity: GRAVITY,
            jump_force: JUMP_FORCE,
            move_speed: MOVE_SPEED,
            landing_tolerance: LANDING_TOLERANCE,
            coin_pickup_radius: COIN_PICKUP_RADIUS,
            tick_rate_hz: TICK_RATE_HZ,
            message_ticks: MESSAGE_TICKS,
            starting_lives: STARTING_LIVES,
        }
    }
}

impl EngineConfig {
    /// Load config from `MATHDEVIL_CONFIG` or `config/mathdevil.toml`.
    /// Falls back to defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("MATHDEVIL_CONFIG")
            .unwrap_or_else(|_| "config/mathdevil.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    EngineConfig::default()
                },
            },
            Err(_) => EngineConfig::default(),
        }
    }

    /// Parse a TOML document. Missing keys take their default values, and
    /// out-of-range values are clamped into something playable.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<EngineConfig>(content).map(EngineConfig::sanitized)
    }

    /// Clamp every field into a range the level generator and physics accept.
    pub(crate) fn sanitized(mut self) -> Self {
        let defaults = EngineConfig::default();
        if !(self.canvas_width.is_finite() && self.canvas_width >= 200.0) {
            tracing::warn!(value = self.canvas_width, "canvas_width too small, using default");
            self.canvas_width = defaults.canvas_width;
        }
        if !(self.canvas_height.is_finite() && self.canvas_height >= 420.0) {
            tracing::warn!(value = self.canvas_height, "canvas_height too small, using default");
            self.canvas_height = defaults.canvas_height;
        }
        if !(self.player_size.is_finite()
            && self.player_size > 0.0
            && self.player_size <= self.canvas_width / 4.0)
        {
            tracing::warn!(value = self.player_size, "player_size out of range, using default");
            self.player_size = defaults.player_size;
        }
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            self.tick_rate_hz = defaults.tick_rate_hz;
        }
        self.starting_lives = self.starting_lives.clamp(1, STARTING_LIVES);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let cfg = EngineConfig::from_toml_str("gravity = 0.7\nstarting_lives = 2\n").unwrap();
        assert_eq!(cfg.gravity, 0.7);
        assert_eq!(cfg.starting_lives, 2);
        assert_eq!(cfg.move_speed, MOVE_SPEED);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(EngineConfig::from_toml_str("gravity = \"heavy\"").is_err());
    }

    #[test]
    fn tiny_canvas_is_replaced() {
        let cfg = EngineConfig::from_toml_str("canvas_width = 10.0\ncanvas_height = 5.0").unwrap();
        assert_eq!(cfg.canvas_width, CANVAS_WIDTH);
        assert_eq!(cfg.canvas_height, CANVAS_HEIGHT);
    }

    #[test]
    fn zero_lives_clamped_to_one() {
        let cfg = EngineConfig::from_toml_str("starting_lives = 0").unwrap();
        assert_eq!(cfg.starting_lives, 1);
    }

    #[test]
    fn lives_above_three_clamped() {
        let cfg = EngineConfig::from_toml_str("starting_lives = 9").unwrap();
        assert_eq!(cfg.starting_lives, STARTING_LIVES);
    }

    #[test]
    fn oversized_player_is_replaced() {
        let cfg = EngineConfig {
            player_size: 500.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(cfg.player_size, PLAYER_SIZE);
    }

    #[test]
    fn config_serializes_back_to_toml() {
        let text = toml::to_string(&EngineConfig::default()).unwrap();
        let back = EngineConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, EngineConfig::default());
    }
}
