use std::fmt;

use hitfive_data::history::History;

use crate::gaps::OccurrenceIndex;
use crate::summary::{mean, std_dev};

/// Spreads below this are treated as zero.
const STD_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Hot,
    Warm,
    Cold,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Hot => write!(f, "HOT"),
            Category::Warm => write!(f, "WARM"),
            Category::Cold => write!(f, "COLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub avg: f64,
    pub std: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Thresholds {
    /// `None` when no number has a mean gap.
    pub fn from_mean_gaps(mean_gaps: &[f64], std_mult: f64) -> Option<Self> {
        let avg = mean(mean_gaps)?;
        let std = std_dev(mean_gaps, 0)?;
        let std = if std < STD_EPSILON { 0.0 } else { std };
        Some(Self {
            avg,
            std,
            lower: avg - std_mult * std,
            upper: avg + std_mult * std,
        })
    }

    pub fn categorize(&self, mean_gap: f64) -> Category {
        if self.std == 0.0 {
            Category::Warm
        } else if mean_gap < self.lower {
            Category::Hot
        } else if mean_gap > self.upper {
            Category::Cold
        } else {
            Category::Warm
        }
    }
}

/// A partition of the universe. Each set is in ascending numeric order.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub hot: Vec<u8>,
    pub warm: Vec<u8>,
    pub cold: Vec<u8>,
    /// Absent for rank-based partitions and for empty histories.
    pub thresholds: Option<Thresholds>,
}

impl Classification {
    pub fn numbers(&self, category: Category) -> &[u8] {
        match category {
            Category::Hot => &self.hot,
            Category::Warm => &self.warm,
            Category::Cold => &self.cold,
        }
    }

    pub fn category_of(&self, number: u8) -> Option<Category> {
        [Category::Hot, Category::Warm, Category::Cold]
            .into_iter()
            .find(|&c| self.numbers(c).binary_search(&number).is_ok())
    }

    pub fn len(&self) -> usize {
        self.hot.len() + self.warm.len() + self.cold.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn from_categories(categories: impl Iterator<Item = (u8, Category)>, thresholds: Option<Thresholds>) -> Self {
        let mut classification = Self {
            hot: Vec::new(),
            warm: Vec::new(),
            cold: Vec::new(),
            thresholds,
        };
        for (n, category) in categories {
            match category {
                Category::Hot => classification.hot.push(n),
                Category::Warm => classification.warm.push(n),
                Category::Cold => classification.cold.push(n),
            }
        }
        classification
    }
}

/// Hot/warm/cold by mean gap relative to `avg ± std_mult * std`, computed
/// over numbers drawn at least once. Numbers never drawn are cold.
pub fn classify(index: &OccurrenceIndex, std_mult: f64) -> Classification {
    let universe = index.universe();
    let mean_gaps: Vec<Option<f64>> = universe.numbers().map(|n| index.mean_gap(n)).collect();
    let observed: Vec<f64> = mean_gaps.iter().flatten().copied().collect();
    let thresholds = Thresholds::from_mean_gaps(&observed, std_mult);

    let categories = universe.numbers().zip(mean_gaps).map(|(n, mean_gap)| {
        let category = match (mean_gap, &thresholds) {
            (Some(g), Some(t)) => t.categorize(g),
            _ => Category::Cold,
        };
        (n, category)
    });
    let classification = Classification::from_categories(categories, thresholds);

    log::debug!(
        "classified {} hot / {} warm / {} cold (thresholds {:?})",
        classification.hot.len(),
        classification.warm.len(),
        classification.cold.len(),
        classification.thresholds
    );
    classification
}

pub fn get_hot_warm_cold(history: &History, std_mult: f64) -> Classification {
    classify(&OccurrenceIndex::build(history, None), std_mult)
}

/// Top `hot_n` numbers by frequency are hot, the bottom `cold_n` cold, the
/// rest warm. Frequency ties rank the lower number first.
pub fn classify_by_frequency_rank(index: &OccurrenceIndex, hot_n: usize, cold_n: usize) -> Classification {
    let mut ranked: Vec<u8> = index.universe().numbers().collect();
    ranked.sort_by(|&a, &b| index.frequency(b).cmp(&index.frequency(a)).then(a.cmp(&b)));

    let hot_end = hot_n.min(ranked.len());
    let cold_start = ranked.len().saturating_sub(cold_n).max(hot_end);

    let mut categories: Vec<(u8, Category)> = ranked
        .iter()
        .enumerate()
        .map(|(rank, &n)| {
            let category = if rank < hot_end {
                Category::Hot
            } else if rank >= cold_start {
                Category::Cold
            } else {
                Category::Warm
            };
            (n, category)
        })
        .collect();
    categories.sort_by_key(|&(n, _)| n);

    Classification::from_categories(categories.into_iter(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{make_test_history, sample_history};
    use hitfive_data::models::Universe;

    fn assert_partition(classification: &Classification, universe: Universe) {
        let mut all: Vec<u8> = classification
            .hot
            .iter()
            .chain(&classification.warm)
            .chain(&classification.cold)
            .copied()
            .collect();
        all.sort();
        assert_eq!(all, universe.numbers().collect::<Vec<_>>());
    }

    #[test]
    fn test_sample_partition() {
        let history = sample_history();
        let classification = get_hot_warm_cold(&history, 1.0);
        assert_partition(&classification, history.universe());
        // Never drawn in the sample.
        assert_eq!(classification.category_of(4), Some(Category::Cold));
        // Only drawn at position 0: mean gap 0.
        assert_eq!(classification.category_of(3), Some(Category::Hot));
        assert_eq!(classification.category_of(1), Some(Category::Warm));
        assert_eq!(classification.category_of(30), Some(Category::Cold));
        assert_eq!(classification.category_of(31), None);
    }

    #[test]
    fn test_sample_thresholds() {
        let index = OccurrenceIndex::build(&sample_history(), None);
        let classification = classify(&index, 1.0);
        let t = classification.thresholds.unwrap();
        assert!(t.std > 0.0);
        assert!((t.lower - (t.avg - t.std)).abs() < 1e-12);
        assert!((t.upper - (t.avg + t.std)).abs() < 1e-12);
        for &n in &classification.hot {
            assert!(index.mean_gap(n).unwrap() < t.lower);
        }
        for &n in &classification.cold {
            assert!(index.mean_gap(n).map_or(true, |g| g > t.upper));
        }
    }

    #[test]
    fn test_zero_std_all_warm() {
        // Every number of a 5-number universe drawn each time: identical gaps.
        let universe = Universe::new(5).unwrap();
        let history = History::from_rows(universe, vec![[1u8, 2, 3, 4, 5]; 4]).unwrap();
        let classification = get_hot_warm_cold(&history, 1.0);
        assert_eq!(classification.warm, vec![1, 2, 3, 4, 5]);
        assert!(classification.hot.is_empty());
        assert!(classification.cold.is_empty());
        assert_eq!(classification.thresholds.unwrap().std, 0.0);
    }

    #[test]
    fn test_zero_std_unseen_numbers_stay_cold() {
        // 1..=5 share one mean gap; 6..=10 never come up.
        let universe = Universe::new(10).unwrap();
        let history = History::from_rows(universe, vec![[1u8, 2, 3, 4, 5]; 4]).unwrap();
        let classification = get_hot_warm_cold(&history, 1.0);
        assert_eq!(classification.thresholds.unwrap().std, 0.0);
        assert_eq!(classification.warm, vec![1, 2, 3, 4, 5]);
        assert_eq!(classification.cold, vec![6, 7, 8, 9, 10]);
        assert!(classification.hot.is_empty());
    }

    #[test]
    fn test_empty_history_all_cold() {
        let history = History::empty(Universe::default());
        let classification = get_hot_warm_cold(&history, 1.0);
        assert_eq!(classification.cold.len(), 42);
        assert!(classification.thresholds.is_none());
    }

    #[test]
    fn test_wider_multiplier_shrinks_extremes() {
        let history = make_test_history(80);
        let narrow = get_hot_warm_cold(&history, 0.5);
        let wide = get_hot_warm_cold(&history, 2.0);
        assert!(wide.hot.len() <= narrow.hot.len());
        assert!(wide.warm.len() >= narrow.warm.len());
    }

    #[test]
    fn test_sets_sorted() {
        let classification = get_hot_warm_cold(&make_test_history(50), 1.0);
        for set in [&classification.hot, &classification.warm, &classification.cold] {
            assert!(set.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_frequency_rank() {
        let history = sample_history();
        let index = OccurrenceIndex::build(&history, None);
        let classification = classify_by_frequency_rank(&index, 3, 5);
        assert_partition(&classification, history.universe());
        // 1, 2 and 5 are the only numbers drawn twice.
        assert_eq!(classification.hot, vec![1, 2, 5]);
        assert_eq!(classification.cold.len(), 5);
        assert_eq!(classification.cold, vec![25, 26, 27, 28, 29]);
    }

    #[test]
    fn test_frequency_rank_overlap() {
        let index = OccurrenceIndex::build(&sample_history(), None);
        let classification = classify_by_frequency_rank(&index, 20, 20);
        assert_eq!(classification.hot.len(), 20);
        assert_eq!(classification.cold.len(), 10);
        assert!(classification.warm.is_empty());
    }
}
