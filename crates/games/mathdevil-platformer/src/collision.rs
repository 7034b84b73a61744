use crate::config::EngineConfig;
use crate::level_gen::{Coin, Platform, PlatformBehavior, PlatformKind, Rect};
use crate::physics::Tentative;

/// The surface the player came down on this tick, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Landing {
    /// Supporting landing. `correct` marks the troll-answer platform.
    Stable { platform: usize, correct: bool },
    Spike { platform: usize },
    WrongAnswer { platform: usize },
}

impl Landing {
    pub fn is_hazard(&self) -> bool {
        !matches!(self, Landing::Stable { .. })
    }
}

/// Everything one tick of movement touched. Pure data; the engine applies it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub landing: Option<Landing>,
    /// A fake platform the player dropped through.
    pub touched_fake: Option<usize>,
    /// Indices of uncollected coins now within pickup range.
    pub pickups: Vec<usize>,
    pub exit_reached: bool,
    pub fell_out: bool,
    /// A moving or disappearing platform landed on for the first time.
    pub trigger: Option<usize>,
    /// Resolved player y (snapped onto the platform on a stable landing).
    pub y: f32,
}

/// One-way landing test: the player's bottom edge crossed `rect.y` from above
/// this tick and did not sink deeper than the platform plus tolerance.
pub fn lands_on(
    prev_bottom: f32,
    new_bottom: f32,
    x: f32,
    size: f32,
    rect: &Rect,
    tolerance: f32,
) -> bool {
    let top = rect.y;
    prev_bottom <= top
        && new_bottom >= top
        && new_bottom <= top + rect.height + tolerance
        && x + size > rect.x
        && x < rect.right()
}

/// Compare the tentative position against the level and report what happened.
///
/// Candidate landings are taken from the highest surface down so a platform
/// never hides one sitting above it. Fake platforms are noted and fallen
/// through; the first real surface decides between support and hazard.
pub fn resolve(
    prev_y: f32,
    tentative: &Tentative,
    platforms: &[Platform],
    coins: &[Coin],
    config: &EngineConfig,
) -> Resolution {
    let size = config.player_size;
    let prev_bottom = prev_y + size;
    let new_bottom = tentative.y + size;

    let mut candidates: Vec<(usize, &Platform)> = platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind != PlatformKind::Exit)
        .filter(|(_, p)| {
            lands_on(
                prev_bottom,
                new_bottom,
                tentative.x,
                size,
                &p.rect,
                config.landing_tolerance,
            )
        })
        .collect();
    candidates.sort_by(|a, b| a.1.rect.y.total_cmp(&b.1.rect.y).then(a.0.cmp(&b.0)));

    let mut res = Resolution {
        y: tentative.y,
        ..Resolution::default()
    };

    for (i, p) in candidates {
        let landing = match p.kind {
            PlatformKind::Fake => {
                res.touched_fake.get_or_insert(i);
                continue;
            },
            PlatformKind::Spike => Landing::Spike { platform: i },
            PlatformKind::MathAnswer {
                is_correct: false, ..
            } => Landing::WrongAnswer { platform: i },
            PlatformKind::MathAnswer {
                is_correct: true, ..
            } => Landing::Stable {
                platform: i,
                correct: true,
            },
            PlatformKind::Ground | PlatformKind::SafeStart | PlatformKind::Transit => {
                Landing::Stable {
                    platform: i,
                    correct: false,
                }
            },
            PlatformKind::Exit => continue,
        };
        if let Landing::Stable { .. } = landing {
            res.y = p.rect.y - size;
            if p.behavior != PlatformBehavior::Fixed && !p.behavior.is_triggered() {
                res.trigger = Some(i);
            }
        }
        res.landing = Some(landing);
        break;
    }

    let (cx, cy) = (tentative.x + size / 2.0, res.y + size / 2.0);
    res.pickups = coins
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.collected)
        .filter(|(_, c)| {
            (cx - c.x).abs() < config.coin_pickup_radius
                && (cy - c.y).abs() < config.coin_pickup_radius
        })
        .map(|(i, _)| i)
        .collect();

    let player_rect = Rect::new(tentative.x, res.y, size, size);
    res.exit_reached = platforms
        .last()
        .is_some_and(|exit| {
            exit.kind == PlatformKind::Exit && player_rect.overlaps(&exit.rect)
        });

    res.fell_out = res.landing.is_none() && res.y > config.canvas_height;
    res
}
