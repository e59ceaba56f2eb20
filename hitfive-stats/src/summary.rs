use hitfive_data::history::History;
use hitfive_data::models::DRAW_SIZE;

use crate::gaps::OccurrenceIndex;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with `ddof` delta degrees of freedom (0 = population,
/// 1 = sample). `None` when there are not more than `ddof` values.
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    if values.len() <= ddof {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - ddof) as f64).sqrt())
}

/// Midpoint of the two central values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// n choose k.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result = 1u64;
    for i in 0..k {
        result = result * (n - i) as u64 / (i + 1) as u64;
    }
    result
}

/// Tickets needed to cover every combination of a pool.
pub fn pool_odds(pool_size: usize) -> u64 {
    binomial(pool_size, DRAW_SIZE)
}

pub fn has_consecutive_pair(combo: &[u8]) -> bool {
    let mut sorted = combo.to_vec();
    sorted.sort();
    sorted.windows(2).any(|w| w[0] + 1 == w[1])
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawSummary {
    pub draws: usize,
    pub single_ticket_combinations: u64,
    pub sum_mean: Option<f64>,
    pub sum_std: Option<f64>,
    pub draws_with_consecutive_pair: usize,
    pub consecutive_pair_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberProbability {
    pub number: u8,
    pub empirical: f64,
    pub theoretical: f64,
}

pub fn draw_sums(history: &History) -> Vec<f64> {
    history.draws().iter().map(|d| d.sum() as f64).collect()
}

pub fn summarize(history: &History) -> DrawSummary {
    let sums = draw_sums(history);
    let with_pair = history
        .combos()
        .filter(|c| has_consecutive_pair(c.as_slice()))
        .count();
    let percent = if history.is_empty() {
        0.0
    } else {
        100.0 * with_pair as f64 / history.len() as f64
    };

    DrawSummary {
        draws: history.len(),
        single_ticket_combinations: binomial(history.universe().size(), DRAW_SIZE),
        sum_mean: mean(&sums),
        sum_std: std_dev(&sums, 1),
        draws_with_consecutive_pair: with_pair,
        consecutive_pair_percent: percent,
    }
}

/// Observed share of draws containing each number against the uniform
/// `DRAW_SIZE / max`.
pub fn empirical_probabilities(index: &OccurrenceIndex) -> Vec<NumberProbability> {
    let universe = index.universe();
    let theoretical = DRAW_SIZE as f64 / universe.size() as f64;
    let draws = index.history_len();

    universe
        .numbers()
        .map(|n| NumberProbability {
            number: n,
            empirical: if draws == 0 {
                0.0
            } else {
                index.frequency(n) as f64 / draws as f64
            },
            theoretical,
        })
        .collect()
}
