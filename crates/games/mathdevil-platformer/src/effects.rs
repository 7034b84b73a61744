use serde::{Deserialize, Serialize};

use crate::level_gen::{Platform, PlatformBehavior, PlatformKind};

/// Fraction of the remaining distance a moving platform covers per tick.
pub const MOVE_EASE: f32 = 0.1;
/// Distance under which a moving platform snaps onto its target.
pub const MOVE_SNAP: f32 = 0.5;
/// Ticks between landing on a disappearing platform and the fade starting.
pub const FADE_DELAY_TICKS: u64 = 30;
/// Alpha removed per tick while fading.
pub const FADE_STEP: f32 = 0.05;

/// Identifies one scheduled effect. Effects from an older generation are
/// never applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectKey {
    pub generation: u64,
    pub id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Ease the platform toward its `target_x`.
    MoveTween,
    /// Drain the platform's alpha, then turn it into a fake.
    Fade,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEffect {
    pub key: EffectKey,
    pub platform: usize,
    pub kind: EffectKind,
    pub due_tick: u64,
}

/// Completed effects reported back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
    Arrived { platform: usize },
    Vanished { platform: usize },
}

/// Engine-owned timer queue for platform animations.
#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    generation: u64,
    next_id: u64,
    pending: Vec<ScheduledEffect>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, platform: usize, kind: EffectKind, due_tick: u64) -> EffectKey {
        let key = EffectKey {
            generation: self.generation,
            id: self.next_id,
        };
        self.next_id += 1;
        self.pending.push(ScheduledEffect {
            key,
            platform,
            kind,
            due_tick,
        });
        key
    }

    /// Mark a moving or disappearing platform as triggered and schedule its
    /// effect. Returns `None` for fixed or already-triggered platforms.
    pub fn trigger(
        &mut self,
        platforms: &mut [Platform],
        platform: usize,
        tick: u64,
    ) -> Option<EffectKey> {
        let p = platforms.get_mut(platform)?;
        match &mut p.behavior {
            PlatformBehavior::Moving { triggered, .. } if !*triggered => {
                *triggered = true;
                Some(self.schedule(platform, EffectKind::MoveTween, tick + 1))
            },
            PlatformBehavior::Disappearing { triggered, .. } if !*triggered => {
                *triggered = true;
                Some(self.schedule(platform, EffectKind::Fade, tick + FADE_DELAY_TICKS))
            },
            _ => None,
        }
    }

    /// Drop every pending effect and start a new generation.
    /// Returns how many effects were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.generation += 1;
        cancelled
    }

    /// Apply every effect due at `tick` to the current platform batch.
    pub fn advance(&mut self, tick: u64, platforms: &mut [Platform]) -> Vec<EffectOutcome> {
        let mut outcomes = Vec::new();
        let pending = std::mem::take(&mut self.pending);
        for effect in pending {
            if effect.key.generation != self.generation {
                continue;
            }
            if effect.due_tick > tick {
                self.pending.push(effect);
                continue;
            }
            let Some(p) = platforms.get_mut(effect.platform) else {
                continue;
            };
            match (effect.kind, &mut p.behavior) {
                (EffectKind::MoveTween, PlatformBehavior::Moving { target_x, .. }) => {
                    let dx = *target_x - p.rect.x;
                    if dx.abs() < MOVE_SNAP {
                        p.rect.x = *target_x;
                        outcomes.push(EffectOutcome::Arrived {
                            platform: effect.platform,
                        });
                    } else {
                        p.rect.x += dx * MOVE_EASE;
                        self.pending.push(ScheduledEffect {
                            due_tick: tick + 1,
                            ..effect
                        });
                    }
                },
                (EffectKind::Fade, PlatformBehavior::Disappearing { alpha, .. }) => {
                    *alpha = (*alpha - FADE_STEP).max(0.0);
                    if *alpha < FADE_STEP / 2.0 {
                        *alpha = 0.0;
                        p.kind = PlatformKind::Fake;
                        outcomes.push(EffectOutcome::Vanished {
                            platform: effect.platform,
                        });
                    } else {
                        self.pending.push(ScheduledEffect {
                            due_tick: tick + 1,
                            ..effect
                        });
                    }
                },
                // Behavior no longer matches; the effect has nothing to drive.
                _ => {},
            }
        }
        outcomes
    }
}
