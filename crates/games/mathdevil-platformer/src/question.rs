use rand::Rng;
use serde::{Deserialize, Serialize};

/// Expression shapes, in the order they unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Template {
    /// `a - b × c`, misread as `(a - b) × c`.
    SubtractMultiply,
    /// `a + b × c`, misread as `(a + b) × c`.
    AddMultiply,
    /// `a - b ÷ c`, misread as `(a - b) ÷ c`.
    SubtractDivide,
    /// `a × b - c`, misread as `a × (b - c)`.
    MultiplySubtract,
}

impl Template {
    pub const ALL: [Template; 4] = [
        Template::SubtractMultiply,
        Template::AddMultiply,
        Template::SubtractDivide,
        Template::MultiplySubtract,
    ];

    /// Templates available on a given level: the first `min(level + 1, 4)`.
    pub fn unlocked(level: u32) -> &'static [Template] {
        let n = (level as usize).saturating_add(1).min(Self::ALL.len());
        &Self::ALL[..n]
    }
}

/// One level's arithmetic prompt and its three candidate answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub template: Template,
    pub display_text: String,
    /// The value the player has to land on.
    pub troll_answer: i32,
    /// The value standard operator precedence gives. Landing on it costs a life.
    pub correct_math_answer: i32,
    pub wrong_answer: i32,
}

/// Largest operand used on a level.
const MAX_OPERAND: i32 = 25;
/// Largest multiplier or divisor.
const MAX_FACTOR: i32 = 5;
/// Distractor offset range from the troll answer.
const DISTRACTOR_SPREAD: i32 = 5;
const DISTRACTOR_ATTEMPTS: usize = 16;

fn operand_bound(level: u32) -> i32 {
    (5 + level.min(MAX_OPERAND as u32) as i32).min(MAX_OPERAND)
}

/// Build the question for `level`.
pub fn generate_question<R: Rng>(level: u32, rng: &mut R) -> Question {
    let templates = Template::unlocked(level.max(1));
    let template = templates[rng.random_range(0..templates.len())];
    let bound = operand_bound(level.max(1));

    let (expr, troll, correct) = match template {
        Template::SubtractMultiply => {
            let a = rng.random_range(1..=bound);
            let b = rng.random_range(1..=bound);
            let c = rng.random_range(2..=MAX_FACTOR);
            (format!("{a} - {b} × {c}"), (a - b) * c, a - b * c)
        },
        Template::AddMultiply => {
            let a = rng.random_range(1..=bound);
            let b = rng.random_range(1..=bound);
            let c = rng.random_range(2..=MAX_FACTOR);
            (format!("{a} + {b} × {c}"), (a + b) * c, a + b * c)
        },
        Template::SubtractDivide => {
            // b and (a - b) are both multiples of c so every reading divides evenly.
            let c = rng.random_range(2..=MAX_FACTOR);
            let quotient = rng.random_range(1..=bound);
            let k = rng.random_range(1..=bound);
            let b = c * quotient;
            let a = b + c * k;
            (format!("{a} - {b} ÷ {c}"), k, a - quotient)
        },
        Template::MultiplySubtract => {
            let a = rng.random_range(2..=bound);
            let b = rng.random_range(1..=bound);
            let c = rng.random_range(1..=bound);
            (format!("{a} × {b} - {c}"), a * (b - c), a * b - c)
        },
    };

    let wrong = pick_distractor(troll, correct, rng);
    Question {
        template,
        display_text: format!("{expr} = ?"),
        troll_answer: troll,
        correct_math_answer: correct,
        wrong_answer: wrong,
    }
}

fn pick_distractor<R: Rng>(troll: i32, correct: i32, rng: &mut R) -> i32 {
    for _ in 0..DISTRACTOR_ATTEMPTS {
        let offset = rng.random_range(1..=DISTRACTOR_SPREAD);
        let candidate = if rng.random_bool(0.5) {
            troll + offset
        } else {
            troll - offset
        };
        if candidate != troll && candidate != correct {
            return candidate;
        }
    }
    troll.max(correct) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn evaluate(text: &str) -> (i32, i32) {
        // Parse "a OP b OP c = ?" and evaluate both readings.
        let parts: Vec<&str> = text.trim_end_matches(" = ?").split(' ').collect();
        let a: i32 = parts[0].parse().unwrap();
        let b: i32 = parts[2].parse().unwrap();
        let c: i32 = parts[4].parse().unwrap();
        match (parts[1], parts[3]) {
            ("-", "×") => ((a - b) * c, a - b * c),
            ("+", "×") => ((a + b) * c, a + b * c),
            ("-", "÷") => ((a - b) / c, a - b / c),
            ("×", "-") => (a * (b - c), a * b - c),
            other => panic!("unexpected operators {other:?}"),
        }
    }

    #[test]
    fn level_one_uses_first_two_templates() {
        assert_eq!(
            Template::unlocked(1),
            &[Template::SubtractMultiply, Template::AddMultiply]
        );
        assert_eq!(Template::unlocked(3).len(), 4);
        assert_eq!(Template::unlocked(40).len(), 4);
    }

    #[test]
    fn text_matches_answers() {
        let mut rng = StdRng::seed_from_u64(7);
        for level in 1..12 {
            let q = generate_question(level, &mut rng);
            let (troll, correct) = evaluate(&q.display_text);
            assert_eq!(q.troll_answer, troll, "{}", q.display_text);
            assert_eq!(q.correct_math_answer, correct, "{}", q.display_text);
        }
    }

    #[test]
    fn division_is_exact() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = 0;
        for _ in 0..200 {
            let q = generate_question(4, &mut rng);
            if q.template != Template::SubtractDivide {
                continue;
            }
            seen += 1;
            let parts: Vec<i32> = q
                .display_text
                .split(' ')
                .filter_map(|s| s.parse().ok())
                .collect();
            let (a, b, c) = (parts[0], parts[1], parts[2]);
            assert_eq!(b % c, 0);
            assert_eq!((a - b) % c, 0);
        }
        assert!(seen > 0, "SubtractDivide must appear at level 4");
    }

    #[test]
    fn distractor_avoids_nearby_correct_answer() {
        // Correct sits inside the distractor spread and must still be avoided.
        let mut rng = StdRng::seed_from_u64(0);
        let wrong = pick_distractor(10, 11, &mut rng);
        assert_ne!(wrong, 10);
        assert_ne!(wrong, 11);
    }

    #[test]
    fn operand_bound_is_capped() {
        assert_eq!(operand_bound(1), 6);
        assert_eq!(operand_bound(20), 25);
        assert_eq!(operand_bound(u32::MAX), 25);
    }

    #[test]
    fn same_seed_same_question() {
        let q1 = generate_question(5, &mut StdRng::seed_from_u64(99));
        let q2 = generate_question(5, &mut StdRng::seed_from_u64(99));
        assert_eq!(q1, q2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    proptest! {
        #[test]
        fn answers_are_pairwise_distinct(seed in any::<u64>(), level in 1u32..60) {
            let q = generate_question(level, &mut StdRng::seed_from_u64(seed));
            prop_assert_ne!(q.troll_answer, q.correct_math_answer);
            prop_assert_ne!(q.wrong_answer, q.troll_answer);
            prop_assert_ne!(q.wrong_answer, q.correct_math_answer);
        }

        #[test]
        fn template_is_unlocked_for_level(seed in any::<u64>(), level in 1u32..10) {
            let q = generate_question(level, &mut StdRng::seed_from_u64(seed));
            prop_assert!(Template::unlocked(level).contains(&q.template));
        }
    }
}
