use hitfive_data::history::History;
use hitfive_data::models::{Draw, Universe};

/// Positions (oldest first) at which each number was drawn.
///
/// Built in one pass over the draws; every per-number statistic below is
/// read off the index instead of rescanning the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceIndex {
    universe: Universe,
    len: usize,
    positions: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    pub gaps: Vec<usize>,
    /// `None` when the number never occurred: no signal, not zero.
    pub mean_gap: Option<f64>,
    pub current_gap: usize,
    pub longest_gap: Option<usize>,
}

impl OccurrenceIndex {
    pub fn from_draws(draws: &[Draw], universe: Universe) -> Self {
        let mut positions = vec![Vec::new(); universe.size()];
        for (t, draw) in draws.iter().enumerate() {
            for &n in draw.numbers() {
                if universe.contains(n) {
                    positions[universe.index(n)].push(t);
                }
            }
        }
        Self {
            universe,
            len: draws.len(),
            positions,
        }
    }

    /// Indexes the last `window` draws only (the whole history for `None`).
    /// Positions are then relative to the start of the window.
    pub fn build(history: &History, window: Option<usize>) -> Self {
        Self::from_draws(history.window(window), history.universe())
    }

    pub fn universe(&self) -> Universe {
        self.universe
    }

    /// Number of draws indexed.
    pub fn history_len(&self) -> usize {
        self.len
    }

    pub fn positions(&self, number: u8) -> &[usize] {
        if !self.universe.contains(number) {
            return &[];
        }
        &self.positions[self.universe.index(number)]
    }

    pub fn frequency(&self, number: u8) -> u32 {
        self.positions(number).len() as u32
    }

    /// Occurrences within the last `window` indexed draws.
    pub fn frequency_in_last(&self, number: u8, window: usize) -> u32 {
        let start = self.len.saturating_sub(window);
        let positions = self.positions(number);
        (positions.len() - positions.partition_point(|&p| p < start)) as u32
    }

    /// `[p1, p2 - p1, ..., pk - p(k-1)]` for occurrences at `p1 < ... < pk`.
    pub fn gap_record(&self, number: u8) -> Vec<usize> {
        let positions = self.positions(number);
        let mut gaps = Vec::with_capacity(positions.len());
        let mut previous = 0;
        for &p in positions {
            gaps.push(p - previous);
            previous = p;
        }
        gaps
    }

    pub fn mean_gap(&self, number: u8) -> Option<f64> {
        // The gap record telescopes to the last position.
        let positions = self.positions(number);
        let last = *positions.last()?;
        Some(last as f64 / positions.len() as f64)
    }

    /// Draws since the most recent occurrence: 0 if drawn last, the history
    /// length if never drawn.
    pub fn current_gap(&self, number: u8) -> usize {
        match self.positions(number).last() {
            Some(&p) => self.len - 1 - p,
            None => self.len,
        }
    }

    pub fn longest_gap(&self, number: u8) -> Option<usize> {
        self.gap_record(number).into_iter().max()
    }

    pub fn number_stats(&self, number: u8) -> NumberStats {
        let gaps = self.gap_record(number);
        NumberStats {
            number,
            frequency: self.frequency(number),
            mean_gap: self.mean_gap(number),
            current_gap: self.current_gap(number),
            longest_gap: gaps.iter().copied().max(),
            gaps,
        }
    }

    pub fn stats(&self) -> Vec<NumberStats> {
        self.universe
            .numbers()
            .map(|n| self.number_stats(n))
            .collect()
    }
}

pub fn compute_stats(history: &History, window: Option<usize>) -> Vec<NumberStats> {
    OccurrenceIndex::build(history, window).stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{make_test_history, sample_history};

    #[test]
    fn test_sample_gap_records() {
        let history = sample_history();
        let index = OccurrenceIndex::build(&history, None);

        assert_eq!(index.gap_record(1), vec![0, 1]);
        assert_eq!(index.mean_gap(1), Some(0.5));
        assert_eq!(index.gap_record(30), vec![2]);
        assert_eq!(index.mean_gap(30), Some(2.0));
        assert_eq!(index.gap_record(5), vec![1, 1]);
        assert_eq!(index.frequency(2), 2);
    }

    #[test]
    fn test_never_seen_has_no_signal() {
        let history = sample_history();
        let index = OccurrenceIndex::build(&history, None);
        assert_eq!(index.frequency(4), 0);
        assert!(index.gap_record(4).is_empty());
        assert_eq!(index.mean_gap(4), None);
        assert_eq!(index.current_gap(4), 3);
        assert_eq!(index.longest_gap(4), None);
    }

    #[test]
    fn test_current_gap() {
        let history = sample_history();
        let index = OccurrenceIndex::build(&history, None);
        assert_eq!(index.current_gap(30), 0);
        assert_eq!(index.current_gap(1), 1);
        assert_eq!(index.current_gap(10), 2);
    }

    #[test]
    fn test_window_slices_tail() {
        let history = sample_history();
        let index = OccurrenceIndex::build(&history, Some(2));
        assert_eq!(index.history_len(), 2);
        assert_eq!(index.gap_record(1), vec![0]);
        assert_eq!(index.frequency(10), 0);
        assert_eq!(index.gap_record(30), vec![1]);

        let oversized = OccurrenceIndex::build(&history, Some(100));
        assert_eq!(oversized, OccurrenceIndex::build(&history, None));
    }

    #[test]
    fn test_frequency_in_last() {
        let history = sample_history();
        let index = OccurrenceIndex::build(&history, None);
        assert_eq!(index.frequency_in_last(1, 2), 1);
        assert_eq!(index.frequency_in_last(5, 2), 2);
        assert_eq!(index.frequency_in_last(5, 0), 0);
        assert_eq!(index.frequency_in_last(5, 50), 2);
    }

    #[test]
    fn test_empty_history() {
        let history = hitfive_data::history::History::empty(Universe::default());
        let stats = compute_stats(&history, Some(10));
        assert_eq!(stats.len(), 42);
        for s in &stats {
            assert_eq!(s.frequency, 0);
            assert!(s.gaps.is_empty());
            assert_eq!(s.mean_gap, None);
            assert_eq!(s.current_gap, 0);
        }
    }

    #[test]
    fn test_gap_record_sums_to_last_position() {
        let history = make_test_history(60);
        let index = OccurrenceIndex::build(&history, None);
        for n in index.universe().numbers() {
            let gaps = index.gap_record(n);
            assert_eq!(gaps.len() as u32, index.frequency(n));
            if let Some(&last) = index.positions(n).last() {
                assert_eq!(gaps.iter().sum::<usize>(), last);
            }
        }
    }

    #[test]
    fn test_out_of_universe_number() {
        let index = OccurrenceIndex::build(&sample_history(), None);
        assert_eq!(index.frequency(0), 0);
        assert_eq!(index.frequency(99), 0);
    }
}
