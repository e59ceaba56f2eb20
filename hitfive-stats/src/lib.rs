pub mod analysis;
pub mod backtest;
pub mod classify;
pub mod combos;
pub mod config;
pub mod display;
pub mod filters;
pub mod gaps;
pub mod pool;
pub mod scoring;
pub mod summary;

#[cfg(test)]
use hitfive_data::{history::History, models::Universe};

/// Deterministic history over the default universe: draw `i` holds the five
/// consecutive numbers starting at `(i % 8) * 5 + 1`, so 41 and 42 never
/// appear.
#[cfg(test)]
pub(crate) fn make_test_history(n: usize) -> History {
    let rows = (0..n).map(|i| {
        let base = (i % 8) as u8;
        [
            base * 5 + 1,
            base * 5 + 2,
            base * 5 + 3,
            base * 5 + 4,
            base * 5 + 5,
        ]
    });
    History::from_rows(Universe::default(), rows).unwrap()
}

#[cfg(test)]
pub(crate) fn sample_history() -> History {
    let universe = Universe::new(30).unwrap();
    History::from_rows(
        universe,
        [[1u8, 2, 3, 10, 20], [1, 5, 6, 7, 8], [2, 5, 9, 15, 30]],
    )
    .unwrap()
}
