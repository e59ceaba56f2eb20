use anyhow::{bail, Result};

use hitfive_data::history::History;
use hitfive_data::models::Combo;

use crate::backtest::{backtest_pool_strategy, BacktestReport};
use crate::classify::{classify, Classification};
use crate::combos::{mixed_combos, pool_combos};
use crate::config::{AnalysisConfig, CandidateSource};
use crate::filters::FilterChain;
use crate::gaps::{NumberStats, OccurrenceIndex};
use crate::pool::{pool_selection, Pool, PoolSelection};
use crate::scoring::{composite_scores, rank_combos, NumberScores, ScoredCombo};

/// Everything one configured run produces, from per-number statistics to
/// the ranked combinations.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Draws the statistics were computed over.
    pub draws: usize,
    pub stats: Vec<NumberStats>,
    pub classification: Classification,
    pub selection: PoolSelection,
    pub scores: NumberScores,
    /// Combinations generated before filtering.
    pub candidates: usize,
    /// Combinations passing every filter.
    pub accepted: usize,
    pub ranked: Vec<ScoredCombo>,
}

impl Analysis {
    pub fn pool(&self) -> Pool {
        self.selection.numbers()
    }
}

fn check_universe(history: &History, config: &AnalysisConfig) -> Result<()> {
    config.validate()?;
    let universe = config.universe()?;
    if history.universe() != universe {
        bail!(
            "history covers 1..={} but the config expects 1..={}",
            history.universe().max(),
            universe.max()
        );
    }
    Ok(())
}

/// Index, classify, select the pool, generate candidates, filter and rank,
/// all driven by `config`. Filters see the whole history; the statistics
/// only see `config.window`.
pub fn analyze(history: &History, config: &AnalysisConfig) -> Result<Analysis> {
    check_universe(history, config)?;

    let index = OccurrenceIndex::build(history, config.window);
    let classification = classify(&index, config.std_mult);
    let selection = pool_selection(&index, &classification, config.gap_n_cold);
    let scores = composite_scores(&index, config.rolling_window);

    let candidates: Vec<Combo> = match config.candidates {
        CandidateSource::Pool => pool_combos(&selection.numbers()),
        CandidateSource::Mixed => mixed_combos(&classification, &config.mix),
    };
    let chain = FilterChain::from_config(&config.filters, history);
    let accepted = chain.filter(candidates.iter().copied());
    let ranked = rank_combos(&accepted, &scores, config.top_n);

    log::info!(
        "{} draws, pool of {}: {} candidates, {} accepted, top {} kept",
        index.history_len(),
        selection.numbers().len(),
        candidates.len(),
        accepted.len(),
        ranked.len()
    );

    Ok(Analysis {
        draws: index.history_len(),
        stats: index.stats(),
        classification,
        selection,
        scores,
        candidates: candidates.len(),
        accepted: accepted.len(),
        ranked,
    })
}

/// Pool backtest with the configured window, multiplier and overdue count.
pub fn run_backtest(history: &History, config: &AnalysisConfig) -> Result<BacktestReport> {
    check_universe(history, config)?;
    Ok(backtest_pool_strategy(
        history,
        &config.backtest,
        config.std_mult,
        config.gap_n_cold,
    ))
}
