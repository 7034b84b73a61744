use std::f32::consts::TAU;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::question::Question;

/// Axis-aligned rectangle, (x, y) is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn centre_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Strict AABB overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// What a platform is. Fixed at creation, except that a faded
/// [`PlatformBehavior::Disappearing`] platform becomes [`PlatformKind::Fake`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformKind {
    Ground,
    SafeStart,
    Transit,
    MathAnswer { value: i32, is_correct: bool },
    Spike,
    Fake,
    Exit,
}

/// How a platform changes over the life of a level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformBehavior {
    Fixed,
    Moving {
        original_x: f32,
        target_x: f32,
        triggered: bool,
    },
    Disappearing {
        triggered: bool,
        alpha: f32,
    },
}

impl PlatformBehavior {
    pub fn is_triggered(&self) -> bool {
        match self {
            PlatformBehavior::Fixed => false,
            PlatformBehavior::Moving { triggered, .. }
            | PlatformBehavior::Disappearing { triggered, .. } => *triggered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
    pub behavior: PlatformBehavior,
}

impl Platform {
    pub fn fixed(rect: Rect, kind: PlatformKind) -> Self {
        Self {
            rect,
            kind,
            behavior: PlatformBehavior::Fixed,
        }
    }
}

/// A collectible. (x, y) is the centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub x: f32,
    pub y: f32,
    pub collected: bool,
    /// Bobbing animation phase in radians, advanced every tick.
    pub phase: f32,
}

impl Coin {
    fn new(x: f32, y: f32, phase: f32) -> Self {
        Self {
            x,
            y,
            collected: false,
            phase,
        }
    }

    pub fn advance_phase(&mut self) {
        self.phase = (self.phase + COIN_PHASE_STEP) % TAU;
    }
}

/// One level's entities plus where the player starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub platforms: Vec<Platform>,
    pub coins: Vec<Coin>,
    pub spawn: (f32, f32),
}

impl LevelLayout {
    /// The exit is always the last platform of the batch.
    pub fn exit(&self) -> Option<&Platform> {
        self.platforms.last()
    }

    pub fn correct_platform(&self) -> Option<usize> {
        self.platforms.iter().position(|p| {
            matches!(
                p.kind,
                PlatformKind::MathAnswer {
                    is_correct: true,
                    ..
                }
            )
        })
    }
}

const COIN_PHASE_STEP: f32 = 0.1;
const PLATFORM_HEIGHT: f32 = 15.0;
const TRANSIT_WIDTH: f32 = 70.0;
const MATH_WIDTH: f32 = 80.0;
/// Math platform slots as fractions of canvas width.
const MATH_SLOTS: [f32; 3] = [0.075, 0.4, 0.725];
/// Random upward jitter applied to the math row.
const MATH_JITTER: f32 = 30.0;
const SPIKE_WIDTH: f32 = 40.0;
const SPIKE_HEIGHT: f32 = 20.0;
const MOVE_DISTANCE: f32 = 45.0;
const COIN_LIFT: f32 = 35.0;
const MAX_BONUS_COINS: u32 = 5;

/// Lay out platforms and coins for `level`.
///
/// Platforms are emitted as ground, safe start, first transit, three math
/// answers, two intermediate transits, level-gated hazards and the exit,
/// which is always last.
pub fn build_level<R: Rng>(
    level: u32,
    question: &Question,
    config: &EngineConfig,
    rng: &mut R,
) -> LevelLayout {
    let w = config.canvas_width;
    let h = config.canvas_height;
    let mut platforms = Vec::with_capacity(12);

    platforms.push(Platform::fixed(
        Rect::new(0.0, h - 20.0, w, 20.0),
        PlatformKind::Ground,
    ));
    let safe = Rect::new(20.0, h - 100.0, 100.0, PLATFORM_HEIGHT);
    platforms.push(Platform::fixed(safe, PlatformKind::SafeStart));
    let first_transit = Rect::new(w * 0.375, h - 150.0, TRANSIT_WIDTH, PLATFORM_HEIGHT);
    platforms.push(Platform::fixed(first_transit, PlatformKind::Transit));

    // Math row: the troll answer is the one that lets the player through.
    let mut answers = [
        (question.troll_answer, true),
        (question.correct_math_answer, false),
        (question.wrong_answer, false),
    ];
    answers.shuffle(rng);
    let math_y = h - 235.0 - rng.random_range(0.0..MATH_JITTER);
    let math_start = platforms.len();
    for (slot, (value, is_correct)) in MATH_SLOTS.iter().zip(answers) {
        platforms.push(Platform::fixed(
            Rect::new(w * slot, math_y, MATH_WIDTH, PLATFORM_HEIGHT),
            PlatformKind::MathAnswer { value, is_correct },
        ));
    }

    let transit_a = Rect::new(w * 0.2, h - 330.0, TRANSIT_WIDTH, PLATFORM_HEIGHT);
    let transit_a_index = platforms.len();
    platforms.push(Platform::fixed(transit_a, PlatformKind::Transit));
    platforms.push(Platform::fixed(
        Rect::new(w * 0.575, h - 360.0, TRANSIT_WIDTH, PLATFORM_HEIGHT),
        PlatformKind::Transit,
    ));

    if level > 2 {
        let x = rng.random_range(w * 0.55..=w * 0.8);
        platforms.push(Platform::fixed(
            Rect::new(x, h - 190.0, TRANSIT_WIDTH, PLATFORM_HEIGHT),
            PlatformKind::Fake,
        ));
        platforms.push(Platform::fixed(
            Rect::new(w / 2.0 - SPIKE_WIDTH / 2.0, h - 40.0, SPIKE_WIDTH, SPIKE_HEIGHT),
            PlatformKind::Spike,
        ));
    }
    if level > 4 {
        platforms.push(Platform::fixed(
            Rect::new(w * 0.8 - SPIKE_WIDTH / 2.0, h - 40.0, SPIKE_WIDTH, SPIKE_HEIGHT),
            PlatformKind::Spike,
        ));
    }

    if level > 3 && rng.random_bool(0.5) {
        let correct = (math_start..math_start + 3).find(|&i| {
            matches!(
                platforms[i].kind,
                PlatformKind::MathAnswer {
                    is_correct: true,
                    ..
                }
            )
        });
        if let Some(i) = correct {
            let rect = platforms[i].rect;
            let mut target_x = rect.x + MOVE_DISTANCE;
            if target_x + rect.width > w {
                target_x = rect.x - MOVE_DISTANCE;
            }
            platforms[i].behavior = PlatformBehavior::Moving {
                original_x: rect.x,
                target_x,
                triggered: false,
            };
        }
    }
    if level > 4 {
        platforms[transit_a_index].behavior = PlatformBehavior::Disappearing {
            triggered: false,
            alpha: 1.0,
        };
    }

    platforms.push(Platform::fixed(
        Rect::new(w - 70.0, h - 410.0, 50.0, 70.0),
        PlatformKind::Exit,
    ));

    let mut coins = Vec::new();
    for rect in [first_transit, transit_a] {
        coins.push(Coin::new(
            rect.centre_x(),
            rect.y - COIN_LIFT,
            rng.random_range(0.0..TAU),
        ));
    }
    for p in &platforms[math_start..math_start + 3] {
        coins.push(Coin::new(
            p.rect.centre_x(),
            p.rect.y - COIN_LIFT,
            rng.random_range(0.0..TAU),
        ));
    }
    for _ in 0..level.min(MAX_BONUS_COINS) {
        let x = rng.random_range(20.0..=w - 20.0);
        let y = rng.random_range(60.0..=h - 80.0);
        coins.push(Coin::new(x, y, rng.random_range(0.0..TAU)));
    }

    let spawn = (50.0, safe.y - config.player_size);
    LevelLayout {
        platforms,
        coins,
        spawn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::generate_question;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn layout(level: u32, seed: u64) -> (Question, LevelLayout) {
        let mut rng = StdRng::seed_from_u64(seed);
        let q = generate_question(level, &mut rng);
        let l = build_level(level, &q, &EngineConfig::default(), &mut rng);
        (q, l)
    }

    fn count(l: &LevelLayout, pred: impl Fn(&Platform) -> bool) -> usize {
        l.platforms.iter().filter(|p| pred(p)).count()
    }

    #[test]
    fn fixed_prefix_order() {
        let (_, l) = layout(1, 1);
        assert_eq!(l.platforms[0].kind, PlatformKind::Ground);
        assert_eq!(l.platforms[1].kind, PlatformKind::SafeStart);
        assert_eq!(l.platforms[2].kind, PlatformKind::Transit);
        for p in &l.platforms[3..6] {
            assert!(matches!(p.kind, PlatformKind::MathAnswer { .. }));
        }
        assert_eq!(l.exit().map(|p| p.kind), Some(PlatformKind::Exit));
    }

    #[test]
    fn math_values_match_question() {
        let (q, l) = layout(2, 5);
        let mut values: Vec<i32> = l
            .platforms
            .iter()
            .filter_map(|p| match p.kind {
                PlatformKind::MathAnswer { value, .. } => Some(value),
                _ => None,
            })
            .collect();
        values.sort_unstable();
        let mut expected = vec![q.troll_answer, q.correct_math_answer, q.wrong_answer];
        expected.sort_unstable();
        assert_eq!(values, expected);
    }

    #[test]
    fn level_one_has_no_hazards() {
        let (_, l) = layout(1, 3);
        assert_eq!(count(&l, |p| p.kind == PlatformKind::Spike), 0);
        assert_eq!(count(&l, |p| p.kind == PlatformKind::Fake), 0);
        assert!(
            l.platforms
                .iter()
                .all(|p| p.behavior == PlatformBehavior::Fixed)
        );
    }

    #[test]
    fn level_three_adds_fake_and_centre_spike() {
        let (_, l) = layout(3, 3);
        assert_eq!(count(&l, |p| p.kind == PlatformKind::Spike), 1);
        assert_eq!(count(&l, |p| p.kind == PlatformKind::Fake), 1);
    }

    #[test]
    fn level_five_adds_second_spike_and_disappearing() {
        let (_, l) = layout(5, 3);
        assert_eq!(count(&l, |p| p.kind == PlatformKind::Spike), 2);
        assert_eq!(
            count(&l, |p| matches!(
                p.behavior,
                PlatformBehavior::Disappearing { .. }
            )),
            1
        );
    }

    #[test]
    fn moving_platform_is_always_the_correct_one() {
        let mut saw_moving = false;
        for seed in 0..40 {
            let (_, l) = layout(4, seed);
            for (i, p) in l.platforms.iter().enumerate() {
                if let PlatformBehavior::Moving {
                    original_x,
                    target_x,
                    ..
                } = p.behavior
                {
                    saw_moving = true;
                    assert_eq!(Some(i), l.correct_platform());
                    assert_eq!(original_x, p.rect.x);
                    assert!(target_x >= 0.0 && target_x + p.rect.width <= 400.0);
                }
            }
        }
        assert!(saw_moving, "Coin flip should enable moving at least once");
    }

    #[test]
    fn coin_counts_per_level() {
        assert_eq!(layout(1, 9).1.coins.len(), 2 + 3 + 1);
        assert_eq!(layout(3, 9).1.coins.len(), 2 + 3 + 3);
        assert_eq!(layout(12, 9).1.coins.len(), 2 + 3 + 5);
    }

    #[test]
    fn spawn_stands_on_safe_start() {
        let (_, l) = layout(1, 0);
        let safe = l.platforms[1].rect;
        assert_eq!(l.spawn.1 + EngineConfig::default().player_size, safe.y);
        assert!(l.spawn.0 >= safe.x && l.spawn.0 < safe.right());
    }

    #[test]
    fn deterministic_generation() {
        assert_eq!(layout(6, 42), layout(6, 42));
    }

    #[test]
    fn rect_overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    }
}
