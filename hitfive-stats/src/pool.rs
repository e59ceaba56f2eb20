use std::collections::BTreeSet;

use hitfive_data::history::History;

use crate::classify::{classify, Classification};
use crate::gaps::OccurrenceIndex;
use crate::summary::median;

/// Candidate numbers, ascending and without duplicates.
pub type Pool = BTreeSet<u8>;

/// The three sources a pool is assembled from, kept apart for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSelection {
    pub hot: Vec<u8>,
    /// Longest current gaps first.
    pub excessively_cold: Vec<u8>,
    pub qualified_warm: Vec<u8>,
    /// `None` when there are no warm numbers.
    pub warm_median_gap: Option<f64>,
}

impl PoolSelection {
    pub fn numbers(&self) -> Pool {
        self.hot
            .iter()
            .chain(&self.excessively_cold)
            .chain(&self.qualified_warm)
            .copied()
            .collect()
    }
}

/// The `n` numbers out longest right now. Ties go to the lower number.
pub fn excessively_cold(index: &OccurrenceIndex, n: usize) -> Vec<u8> {
    let mut numbers: Vec<u8> = index.universe().numbers().collect();
    numbers.sort_by(|&a, &b| {
        index
            .current_gap(b)
            .cmp(&index.current_gap(a))
            .then(a.cmp(&b))
    });
    numbers.truncate(n);
    numbers
}

/// Warm numbers whose current gap reaches the median current gap of the
/// warm set, with that median.
pub fn qualified_warm(index: &OccurrenceIndex, warm: &[u8]) -> (Vec<u8>, Option<f64>) {
    let gaps: Vec<f64> = warm.iter().map(|&n| index.current_gap(n) as f64).collect();
    let Some(threshold) = median(&gaps) else {
        return (Vec::new(), None);
    };
    let qualified = warm
        .iter()
        .zip(&gaps)
        .filter(|&(_, &gap)| gap >= threshold)
        .map(|(&n, _)| n)
        .collect();
    (qualified, Some(threshold))
}

pub fn pool_selection(index: &OccurrenceIndex, classification: &Classification, gap_n_cold: usize) -> PoolSelection {
    let (qualified_warm, warm_median_gap) = qualified_warm(index, &classification.warm);
    let selection = PoolSelection {
        hot: classification.hot.clone(),
        excessively_cold: excessively_cold(index, gap_n_cold),
        qualified_warm,
        warm_median_gap,
    };
    log::debug!(
        "pool from {} hot, {} overdue, {} warm (median gap {:?})",
        selection.hot.len(),
        selection.excessively_cold.len(),
        selection.qualified_warm.len(),
        selection.warm_median_gap
    );
    selection
}

/// Hot numbers, the `gap_n_cold` most overdue numbers and the warm numbers
/// at or past their set's median current gap.
pub fn select_pool(index: &OccurrenceIndex, classification: &Classification, gap_n_cold: usize) -> Pool {
    pool_selection(index, classification, gap_n_cold).numbers()
}

/// Classifies the (optionally windowed) history and selects its pool.
pub fn select_pool_for_history(history: &History, window: Option<usize>, std_mult: f64, gap_n_cold: usize) -> Pool {
    let index = OccurrenceIndex::build(history, window);
    let classification = classify(&index, std_mult);
    select_pool(&index, &classification, gap_n_cold)
}

/// The first `n_hot`, `n_warm` and `n_cold` numbers of each category, in
/// ascending order. Short categories contribute what they have.
pub fn select_gap_pool(classification: &Classification, n_hot: usize, n_warm: usize, n_cold: usize) -> Pool {
    let take = |numbers: &[u8], n: usize| numbers.iter().take(n).copied().collect::<Vec<_>>();
    take(&classification.hot, n_hot)
        .into_iter()
        .chain(take(&classification.warm, n_warm))
        .chain(take(&classification.cold, n_cold))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::get_hot_warm_cold;
    use crate::{make_test_history, sample_history};

    #[test]
    fn test_excessively_cold_ties_ascending() {
        let index = OccurrenceIndex::build(&sample_history(), None);
        // 4, 11, 12, ... were never drawn: current gap 3.
        assert_eq!(excessively_cold(&index, 3), vec![4, 11, 12]);
        assert!(excessively_cold(&index, 0).is_empty());
        assert_eq!(excessively_cold(&index, 100).len(), 30);
    }

    #[test]
    fn test_qualified_warm_median() {
        let index = OccurrenceIndex::build(&sample_history(), None);
        // current gaps: 1 -> 1, 2 -> 0, 6 -> 1, 30 -> 0
        let (qualified, median) = qualified_warm(&index, &[1, 2, 6, 30]);
        assert_eq!(median, Some(0.5));
        assert_eq!(qualified, vec![1, 6]);

        let (none, no_median) = qualified_warm(&index, &[]);
        assert!(none.is_empty());
        assert_eq!(no_median, None);
    }

    #[test]
    fn test_sample_pool() {
        let history = sample_history();
        let index = OccurrenceIndex::build(&history, None);
        let classification = classify(&index, 1.0);
        let selection = pool_selection(&index, &classification, 5);
        let pool = selection.numbers();

        assert_eq!(selection.hot, vec![3, 10, 20]);
        assert_eq!(selection.excessively_cold, vec![4, 11, 12, 13, 14]);
        assert_eq!(selection.warm_median_gap, Some(1.0));
        for n in &classification.hot {
            assert!(pool.contains(n));
        }
        assert_eq!(pool, select_pool(&index, &classification, 5));
    }

    #[test]
    fn test_pool_contains_hot_and_fits_universe() {
        let history = make_test_history(90);
        for gap_n_cold in [0, 5, 50] {
            let index = OccurrenceIndex::build(&history, None);
            let classification = classify(&index, 1.0);
            let pool = select_pool(&index, &classification, gap_n_cold);
            assert!(classification.hot.iter().all(|n| pool.contains(n)));
            assert!(pool.len() <= history.universe().size());
            assert!(pool.iter().all(|&n| history.universe().contains(n)));
        }
    }

    #[test]
    fn test_pool_deterministic() {
        let history = make_test_history(70);
        let first = select_pool_for_history(&history, Some(40), 1.0, 5);
        let second = select_pool_for_history(&history, Some(40), 1.0, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_history_pool() {
        let history = History::empty(hitfive_data::models::Universe::default());
        let pool = select_pool_for_history(&history, None, 1.0, 5);
        // Every number is cold with current gap 0: the overdue picks are 1..=5.
        assert_eq!(pool.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_gap_pool_takes_first_of_each() {
        let classification = get_hot_warm_cold(&sample_history(), 1.0);
        let pool = select_gap_pool(&classification, 2, 3, 1);
        assert_eq!(pool.len(), 6);
        assert!(pool.contains(&3) && pool.contains(&10));
        assert!(pool.contains(&1) && pool.contains(&2) && pool.contains(&5));
        assert!(pool.contains(&4));
    }

    #[test]
    fn test_gap_pool_short_category() {
        let classification = get_hot_warm_cold(&sample_history(), 1.0);
        let pool = select_gap_pool(&classification, 10, 0, 0);
        assert_eq!(pool.len(), classification.hot.len());
    }
}
