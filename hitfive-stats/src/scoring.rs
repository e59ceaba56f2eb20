use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use hitfive_data::models::Combo;

use crate::gaps::OccurrenceIndex;
use crate::pool::Pool;

/// Draws counted by the rolling-frequency term.
pub const DEFAULT_ROLLING_WINDOW: usize = 30;

/// Sum of the historical frequencies of the numbers in `combo`.
pub fn frequency_score(index: &OccurrenceIndex, combo: &[u8]) -> u32 {
    combo.iter().map(|&n| index.frequency(n)).sum()
}

/// Rescales to [0, 1]. A constant input maps to all zeros.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}

/// Per-number composite score: rarely drawn overall, long out and quiet
/// lately all push a number up.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberScores {
    scores: Vec<f64>,
}

impl NumberScores {
    pub fn get(&self, number: u8) -> f64 {
        match number.checked_sub(1) {
            Some(i) => self.scores.get(i as usize).copied().unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// `(number, score)` pairs in ascending numeric order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.scores.iter().enumerate().map(|(i, &s)| (i as u8 + 1, s))
    }

    pub fn combo_score(&self, combo: &[u8]) -> f64 {
        combo.iter().map(|&n| self.get(n)).sum()
    }

    /// The `n` best numbers. Equal scores keep the lower number.
    pub fn top_numbers(&self, n: usize) -> Pool {
        let mut ranked: Vec<(u8, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(n).map(|(number, _)| number).collect()
    }
}

/// `(1 - freq_norm) + gap_norm + (1 - rolling_norm)`, each term min-max
/// normalized over the universe; the rolling term counts the last
/// `rolling_window` indexed draws.
pub fn composite_scores(index: &OccurrenceIndex, rolling_window: usize) -> NumberScores {
    let universe = index.universe();
    let frequency: Vec<f64> = universe.numbers().map(|n| index.frequency(n) as f64).collect();
    let gap: Vec<f64> = universe.numbers().map(|n| index.current_gap(n) as f64).collect();
    let rolling: Vec<f64> = universe
        .numbers()
        .map(|n| index.frequency_in_last(n, rolling_window) as f64)
        .collect();

    let frequency = min_max_normalize(&frequency);
    let gap = min_max_normalize(&gap);
    let rolling = min_max_normalize(&rolling);

    let scores = frequency
        .iter()
        .zip(&gap)
        .zip(&rolling)
        .map(|((f, g), r)| (1.0 - f) + g + (1.0 - r))
        .collect();
    NumberScores { scores }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCombo {
    pub combo: Combo,
    pub score: f64,
}

/// Scores every combo, best first (ties in lexicographic order), keeping
/// the first `top_n`.
pub fn rank_combos(combos: &[Combo], scores: &NumberScores, top_n: usize) -> Vec<ScoredCombo> {
    let mut scored: Vec<ScoredCombo> = combos
        .iter()
        .map(|&combo| ScoredCombo {
            combo,
            score: scores.combo_score(&combo),
        })
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.combo.cmp(&b.combo))
    });
    scored.truncate(top_n);
    scored
}
