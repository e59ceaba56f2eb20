use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use hitfive_data::history::History;
use hitfive_data::models::{Combo, Draw, Universe, DRAW_SIZE};

use crate::classify::classify;
use crate::config::BacktestConfig;
use crate::gaps::OccurrenceIndex;
use crate::pool::select_pool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestStep {
    /// Position of the tested draw in the history.
    pub position: usize,
    pub draw: Combo,
    pub pool_size: usize,
    pub matches: usize,
    pub all_in_pool: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub steps: Vec<BacktestStep>,
    /// Share of tested draws lying entirely inside their pool.
    pub coverage: f64,
    pub mean_matches: f64,
    pub mean_pool_size: f64,
    /// `match_distribution[k]` counts draws with exactly `k` numbers in the pool.
    pub match_distribution: [usize; DRAW_SIZE + 1],
}

impl BacktestReport {
    fn from_steps(steps: Vec<BacktestStep>) -> Self {
        let mut match_distribution = [0usize; DRAW_SIZE + 1];
        for step in &steps {
            match_distribution[step.matches.min(DRAW_SIZE)] += 1;
        }
        let n = steps.len();
        let average = |total: usize| if n == 0 { 0.0 } else { total as f64 / n as f64 };

        Self {
            coverage: average(steps.iter().filter(|s| s.all_in_pool).count()),
            mean_matches: average(steps.iter().map(|s| s.matches).sum()),
            mean_pool_size: average(steps.iter().map(|s| s.pool_size).sum()),
            match_distribution,
            steps,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Pool for the draw at `position`, built from `train` only.
fn evaluate_step(
    train: &[Draw],
    draw: &Draw,
    position: usize,
    universe: Universe,
    std_mult: f64,
    gap_n_cold: usize,
) -> BacktestStep {
    let index = OccurrenceIndex::from_draws(train, universe);
    let classification = classify(&index, std_mult);
    let pool = select_pool(&index, &classification, gap_n_cold);

    let matches = draw.numbers().iter().filter(|&n| pool.contains(n)).count();
    BacktestStep {
        position,
        draw: *draw.numbers(),
        pool_size: pool.len(),
        matches,
        all_in_pool: matches == DRAW_SIZE,
    }
}

/// Walk-forward replay of the pool selection over the last
/// `config.test_window` draws. A step trains on the earlier draws inside the
/// window, or on every earlier draw when `config.train_within_window` is
/// off, and is skipped when fewer than `config.min_train` are available.
pub fn backtest_pool_strategy(
    history: &History,
    config: &BacktestConfig,
    std_mult: f64,
    gap_n_cold: usize,
) -> BacktestReport {
    let draws = history.draws();
    let window_start = draws.len().saturating_sub(config.test_window);
    let train_start = if config.train_within_window { window_start } else { 0 };
    let first = window_start.max(train_start + config.min_train);

    let steps: Vec<BacktestStep> = (first..draws.len())
        .into_par_iter()
        .map(|position| {
            evaluate_step(
                &draws[train_start..position],
                &draws[position],
                position,
                history.universe(),
                std_mult,
                gap_n_cold,
            )
        })
        .collect();

    if steps.is_empty() {
        log::warn!(
            "no backtest steps: {} draws, test window {}, min train {}",
            history.len(),
            config.test_window,
            config.min_train
        );
    }

    let report = BacktestReport::from_steps(steps);
    log::info!(
        "backtest over {} draws: coverage {:.2}%, mean matches {:.2}",
        report.len(),
        report.coverage * 100.0,
        report.mean_matches
    );
    report
}

pub fn save_report(report: &BacktestReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("cannot write {:?}", path))?;
    Ok(())
}

pub fn load_report(path: &Path) -> Result<BacktestReport> {
    let json = std::fs::read_to_string(path).with_context(|| format!("cannot read {:?}", path))?;
    let report: BacktestReport = serde_json::from_str(&json)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_history;

    #[test]
    fn test_step_counts() {
        let history = make_test_history(50);
        let config = BacktestConfig {
            test_window: 20,
            min_train: 10,
            train_within_window: false,
        };
        let report = backtest_pool_strategy(&history, &config, 1.0, 5);
        assert_eq!(report.len(), 20);
        assert_eq!(report.steps[0].position, 30);
        assert_eq!(report.steps[19].position, 49);
        assert_eq!(report.match_distribution.iter().sum::<usize>(), 20);
    }

    #[test]
    fn test_min_train_skips_early_steps() {
        let history = make_test_history(30);
        let config = BacktestConfig {
            test_window: 100,
            min_train: 20,
            train_within_window: false,
        };
        let report = backtest_pool_strategy(&history, &config, 1.0, 5);
        assert_eq!(report.len(), 10);
        assert!(report.steps.iter().all(|s| s.position >= 20));
    }

    #[test]
    fn test_default_trains_inside_window() {
        let history = make_test_history(300);
        let report = backtest_pool_strategy(&history, &BacktestConfig::default(), 1.0, 5);
        // 100 tested draws, the first 20 only feed training.
        assert_eq!(report.len(), 80);
        assert_eq!(report.steps[0].position, 220);
        assert_eq!(report.steps[79].position, 299);
    }

    #[test]
    fn test_window_training_ignores_older_draws() {
        let history = make_test_history(60);
        let config = BacktestConfig {
            test_window: 30,
            min_train: 10,
            train_within_window: true,
        };
        let report = backtest_pool_strategy(&history, &config, 1.0, 5);

        let recent: Vec<Combo> = history.tail(30).iter().map(|d| *d.numbers()).collect();
        let trimmed = History::from_rows(history.universe(), recent).unwrap();
        let full = BacktestConfig {
            test_window: 30,
            min_train: 10,
            train_within_window: false,
        };
        let expected = backtest_pool_strategy(&trimmed, &full, 1.0, 5);

        assert_eq!(report.len(), 20);
        assert_eq!(report.len(), expected.len());
        for (step, same) in report.steps.iter().zip(&expected.steps) {
            assert_eq!(step.position, same.position + 30);
            assert_eq!(step.draw, same.draw);
            assert_eq!(step.pool_size, same.pool_size);
            assert_eq!(step.matches, same.matches);
        }
    }

    #[test]
    fn test_full_history_training_differs() {
        let history = make_test_history(300);
        let full = BacktestConfig {
            train_within_window: false,
            ..BacktestConfig::default()
        };
        let report = backtest_pool_strategy(&history, &full, 1.0, 5);
        assert_eq!(report.len(), 100);
        assert_eq!(report.steps[0].position, 200);
    }

    #[test]
    fn test_too_short_history() {
        let history = make_test_history(5);
        let report = backtest_pool_strategy(&history, &BacktestConfig::default(), 1.0, 5);
        assert!(report.is_empty());
        assert_eq!(report.coverage, 0.0);
        assert_eq!(report.mean_matches, 0.0);
    }

    #[test]
    fn test_steps_consistent() {
        let history = make_test_history(60);
        let config = BacktestConfig {
            test_window: 30,
            min_train: 16,
            train_within_window: false,
        };
        let report = backtest_pool_strategy(&history, &config, 1.0, 5);
        for step in &report.steps {
            assert!(step.matches <= DRAW_SIZE);
            assert!(step.pool_size <= 42);
            assert_eq!(step.all_in_pool, step.matches == DRAW_SIZE);
            assert_eq!(&step.draw, history.get(step.position).unwrap().numbers());
        }
        let covered = report.steps.iter().filter(|s| s.all_in_pool).count();
        assert!((report.coverage - covered as f64 / report.len() as f64).abs() < 1e-12);
    }

    #[test]
    fn test_no_future_leak() {
        // Appending draws must not change earlier steps.
        let config = BacktestConfig {
            test_window: 40,
            min_train: 10,
            train_within_window: false,
        };
        let short = backtest_pool_strategy(&make_test_history(40), &config, 1.0, 5);
        let long = backtest_pool_strategy(&make_test_history(48), &config, 1.0, 5);
        for step in &short.steps {
            let same = long.steps.iter().find(|s| s.position == step.position).unwrap();
            assert_eq!(same, step);
        }
    }

    #[test]
    fn test_report_roundtrip() {
        let history = make_test_history(40);
        let report = backtest_pool_strategy(&history, &BacktestConfig::default(), 1.0, 5);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backtest.json");
        save_report(&report, &path).unwrap();
        let loaded = load_report(&path).unwrap();
        assert_eq!(loaded.steps, report.steps);
        assert_eq!(loaded.match_distribution, report.match_distribution);
        assert!((loaded.mean_matches - report.mean_matches).abs() < 1e-9);
        assert!((loaded.coverage - report.coverage).abs() < 1e-9);
    }
}
