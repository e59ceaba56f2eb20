use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use hitfive_data::models::{Universe, DRAW_SIZE};

use crate::filters::DEFAULT_EVEN_REQUIRED;

/// How the sum-range rule gets its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SumRangeConfig {
    Off,
    Fixed { min: u32, max: u32 },
    /// Mean ± `std_mult` sample standard deviations of past draw sums.
    Historical { std_mult: f64 },
}

impl Default for SumRangeConfig {
    fn default() -> Self {
        SumRangeConfig::Historical { std_mult: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Accepted even counts; `None` disables the rule.
    pub even_required: Option<Vec<usize>>,
    pub no_three_consecutive: bool,
    pub exclude_past_draws: bool,
    pub sum_range: SumRangeConfig,
    /// Reject combos sharing a number with the last N draws; 0 disables.
    pub recent_hits: usize,
    pub must_include: Vec<u8>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            even_required: Some(DEFAULT_EVEN_REQUIRED.to_vec()),
            no_three_consecutive: true,
            exclude_past_draws: true,
            sum_range: SumRangeConfig::default(),
            recent_hits: 2,
            must_include: Vec::new(),
        }
    }
}

/// Numbers taken from each category in a mixed combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    pub n_hot: usize,
    pub n_warm: usize,
    pub n_cold: usize,
}

impl MixConfig {
    pub fn total(&self) -> usize {
        self.n_hot + self.n_warm + self.n_cold
    }
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            n_hot: 1,
            n_warm: 3,
            n_cold: 1,
        }
    }
}

/// Where candidate combinations come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    /// Every 5-subset of the selected pool.
    #[default]
    Pool,
    /// Hot × warm × cold combinations sized by `MixConfig`.
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Trailing draws replayed one at a time.
    pub test_window: usize,
    /// Steps with fewer training draws are skipped.
    pub min_train: usize,
    /// Train each step on the earlier draws of the test window only, rather
    /// than on the whole history before it.
    pub train_within_window: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            test_window: 100,
            min_train: 20,
            train_within_window: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub universe_max: u8,
    pub std_mult: f64,
    pub gap_n_cold: usize,
    /// Trailing draws used for the statistics; `None` uses all of them.
    pub window: Option<usize>,
    pub rolling_window: usize,
    pub candidates: CandidateSource,
    /// Ranked combinations kept.
    pub top_n: usize,
    pub filters: FilterConfig,
    pub mix: MixConfig,
    pub backtest: BacktestConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            universe_max: hitfive_data::models::DEFAULT_MAX,
            std_mult: 1.0,
            gap_n_cold: 5,
            window: None,
            rolling_window: crate::scoring::DEFAULT_ROLLING_WINDOW,
            candidates: CandidateSource::default(),
            top_n: 10,
            filters: FilterConfig::default(),
            mix: MixConfig::default(),
            backtest: BacktestConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn universe(&self) -> Result<Universe> {
        Ok(Universe::new(self.universe_max)?)
    }

    pub fn validate(&self) -> Result<()> {
        let universe = self.universe()?;
        if !self.std_mult.is_finite() || self.std_mult < 0.0 {
            bail!("std_mult must be a non-negative number, got {}", self.std_mult);
        }
        if let Some(even) = &self.filters.even_required {
            if let Some(&bad) = even.iter().find(|&&e| e > DRAW_SIZE) {
                bail!("even count {} exceeds draw size {}", bad, DRAW_SIZE);
            }
        }
        if let SumRangeConfig::Fixed { min, max } = self.filters.sum_range {
            if min > max {
                bail!("sum range {}..={} is empty", min, max);
            }
        }
        if let Some(&n) = self.filters.must_include.iter().find(|&&n| !universe.contains(n)) {
            bail!("must_include number {} outside 1..={}", n, universe.max());
        }
        if self.filters.must_include.len() > DRAW_SIZE {
            bail!("must_include lists more than {} numbers", DRAW_SIZE);
        }
        if self.mix.total() != DRAW_SIZE {
            bail!("mixed combos take {} numbers, expected {}", self.mix.total(), DRAW_SIZE);
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_context(|| format!("cannot read {:?}", path))?;
        let config: Self = serde_json::from_str(&json).with_context(|| format!("invalid config {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("cannot write {:?}", path))?;
        log::info!("config saved to {:?}", path);
        Ok(())
    }
}
