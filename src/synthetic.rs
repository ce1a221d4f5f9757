//! Seeded demo fixture. Only reachable through `run --synthetic`; never used as
//! a fallback for missing input.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::input::ScoreCase;
use crate::taxonomy::ConditionTaxonomy;

pub const DEFAULT_SEED: u64 = 42;

/// Share of cases generated as correct predictions.
const TARGET_ACCURACY: f64 = 0.85;

/// Commonly confused condition pairs, by class index.
const CONFUSION_PAIRS: [(usize, usize); 6] = [(1, 2), (3, 8), (6, 4), (7, 1), (13, 7), (9, 3)];

// Q8.8 raw ranges. All stay below the saturation limit so the winner is unique.
const BACKGROUND: (i64, i64) = (-1024, 200);
const RUNNER_UP: (i64, i64) = (300, 800);
const WINNER: (i64, i64) = (900, 1200);

pub fn confusion_partner(class: usize) -> Option<usize> {
    CONFUSION_PAIRS.iter().find_map(|&(a, b)| {
        if a == class {
            Some(b)
        } else if b == class {
            Some(a)
        } else {
            None
        }
    })
}

/// Generates `rounds` labeled cases per taxonomy class.
pub fn generate_cases(taxonomy: &ConditionTaxonomy, rounds: usize, seed: u64) -> Vec<ScoreCase> {
    let mut rng = StdRng::seed_from_u64(seed);
    let classes = taxonomy.len();
    let mut cases = Vec::with_capacity(classes * rounds);

    for round in 0..rounds {
        for class in 0..classes {
            let predicted = if rng.random::<f64>() < TARGET_ACCURACY {
                class
            } else {
                match confusion_partner(class) {
                    Some(partner) if partner < classes && rng.random::<f64>() > 0.5 => partner,
                    _ => rng.random_range(0..classes),
                }
            };

            let mut scores: Vec<i64> = (0..classes)
                .map(|_| rng.random_range(BACKGROUND.0..=BACKGROUND.1))
                .collect();
            if predicted != class {
                scores[class] = rng.random_range(RUNNER_UP.0..=RUNNER_UP.1);
            }
            scores[predicted] = rng.random_range(WINNER.0..=WINNER.1);

            let position = cases.len();
            cases.push(ScoreCase {
                position,
                line: 0,
                test_id: (round * classes + class) as u32,
                test_name: taxonomy.name(class),
                expected_index: Some(class),
                scores: Ok(scores),
            });
        }
    }

    cases
}
