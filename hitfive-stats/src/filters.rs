use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use hitfive_data::history::History;
use hitfive_data::models::Combo;

use crate::config::{FilterConfig, SumRangeConfig};
use crate::summary::{draw_sums, mean, std_dev};

/// Accepted even-number counts when none are configured.
pub const DEFAULT_EVEN_REQUIRED: [usize; 2] = [2, 3];

/// Inclusive bounds on the sum of a combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumRange {
    pub min: f64,
    pub max: f64,
}

impl SumRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Mean of the draw sums ± `std_mult` sample standard deviations.
    /// `None` with fewer than two draws.
    pub fn from_history(history: &History, std_mult: f64) -> Option<Self> {
        let sums = draw_sums(history);
        let m = mean(&sums)?;
        let s = std_dev(&sums, 1)?;
        Some(Self::new(m - std_mult * s, m + std_mult * s))
    }

    pub fn contains(&self, sum: u32) -> bool {
        let sum = sum as f64;
        self.min <= sum && sum <= self.max
    }
}

pub fn valid_even_odd(combo: &[u8], even_required: &[usize]) -> bool {
    let evens = combo.iter().filter(|&&n| n % 2 == 0).count();
    even_required.contains(&evens)
}

/// Whether any three numbers of the combination form a run `k, k+1, k+2`.
pub fn has_3_consecutive(combo: &[u8]) -> bool {
    let mut sorted = combo.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.windows(3).any(|w| w[0] + 1 == w[1] && w[1] + 1 == w[2])
}

pub fn in_recent_hits(combo: &[u8], recent: &HashSet<u8>) -> bool {
    combo.iter().any(|n| recent.contains(n))
}

pub fn in_past_draws(combo: &[u8], past: &HashSet<Combo>) -> bool {
    let Ok(mut key) = Combo::try_from(combo) else {
        return false;
    };
    key.sort_unstable();
    past.contains(&key)
}

pub fn in_sum_range(combo: &[u8], range: SumRange) -> bool {
    range.contains(combo.iter().map(|&n| n as u32).sum())
}

/// Vacuously true for an empty `required`.
pub fn must_include(combo: &[u8], required: &[u8]) -> bool {
    required.iter().all(|n| combo.contains(n))
}

/// Numbers drawn in the last `n` draws.
pub fn recent_hits(history: &History, n: usize) -> HashSet<u8> {
    history
        .tail(n)
        .iter()
        .flat_map(|d| d.numbers().iter().copied())
        .collect()
}

pub fn draws_set(history: &History) -> HashSet<Combo> {
    history.combos().copied().collect()
}

/// One acceptance rule over sorted combinations.
pub trait ComboRule: Send + Sync {
    fn name(&self) -> &str;
    fn accepts(&self, combo: &Combo) -> bool;
}

pub struct EvenOddRule {
    even_required: Vec<usize>,
}

impl EvenOddRule {
    pub fn new(even_required: Vec<usize>) -> Self {
        Self { even_required }
    }
}

impl Default for EvenOddRule {
    fn default() -> Self {
        Self::new(DEFAULT_EVEN_REQUIRED.to_vec())
    }
}

impl ComboRule for EvenOddRule {
    fn name(&self) -> &str {
        "even/odd"
    }

    fn accepts(&self, combo: &Combo) -> bool {
        valid_even_odd(combo, &self.even_required)
    }
}

pub struct NoThreeConsecutive;

impl ComboRule for NoThreeConsecutive {
    fn name(&self) -> &str {
        "no 3-run"
    }

    fn accepts(&self, combo: &Combo) -> bool {
        !has_3_consecutive(combo)
    }
}

pub struct NotPastDraw {
    past: HashSet<Combo>,
}

impl NotPastDraw {
    pub fn new(past: HashSet<Combo>) -> Self {
        Self { past }
    }

    pub fn from_history(history: &History) -> Self {
        Self::new(draws_set(history))
    }
}

impl ComboRule for NotPastDraw {
    fn name(&self) -> &str {
        "not drawn before"
    }

    fn accepts(&self, combo: &Combo) -> bool {
        !in_past_draws(combo, &self.past)
    }
}

pub struct SumRangeRule {
    range: SumRange,
}

impl SumRangeRule {
    pub fn new(range: SumRange) -> Self {
        Self { range }
    }
}

impl ComboRule for SumRangeRule {
    fn name(&self) -> &str {
        "sum range"
    }

    fn accepts(&self, combo: &Combo) -> bool {
        in_sum_range(combo, self.range)
    }
}

pub struct MustInclude {
    required: Vec<u8>,
}

impl MustInclude {
    pub fn new(required: Vec<u8>) -> Self {
        Self { required }
    }
}

impl ComboRule for MustInclude {
    fn name(&self) -> &str {
        "must include"
    }

    fn accepts(&self, combo: &Combo) -> bool {
        must_include(combo, &self.required)
    }
}

pub struct NoRecentHits {
    recent: HashSet<u8>,
}

impl NoRecentHits {
    pub fn new(recent: HashSet<u8>) -> Self {
        Self { recent }
    }

    pub fn from_history(history: &History, n: usize) -> Self {
        Self::new(recent_hits(history, n))
    }
}

impl ComboRule for NoRecentHits {
    fn name(&self) -> &str {
        "no recent hits"
    }

    fn accepts(&self, combo: &Combo) -> bool {
        !in_recent_hits(combo, &self.recent)
    }
}

/// Rules joined by AND. An empty chain accepts everything.
#[derive(Default)]
pub struct FilterChain {
    rules: Vec<Box<dyn ComboRule>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: impl ComboRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn push(&mut self, rule: Box<dyn ComboRule>) {
        self.rules.push(rule);
    }

    /// Builds the configured rules, drawing past draws, recent hits and the
    /// historical sum range from `history`.
    pub fn from_config(config: &FilterConfig, history: &History) -> Self {
        let mut chain = Self::new();
        if let Some(even_required) = &config.even_required {
            chain.push(Box::new(EvenOddRule::new(even_required.clone())));
        }
        if config.no_three_consecutive {
            chain.push(Box::new(NoThreeConsecutive));
        }
        if config.exclude_past_draws {
            chain.push(Box::new(NotPastDraw::from_history(history)));
        }
        match config.sum_range {
            SumRangeConfig::Off => {}
            SumRangeConfig::Fixed { min, max } => {
                chain.push(Box::new(SumRangeRule::new(SumRange::new(min as f64, max as f64))));
            }
            SumRangeConfig::Historical { std_mult } => match SumRange::from_history(history, std_mult) {
                Some(range) => chain.push(Box::new(SumRangeRule::new(range))),
                None => log::warn!("not enough draws for a historical sum range, rule skipped"),
            },
        }
        if config.recent_hits > 0 {
            chain.push(Box::new(NoRecentHits::from_history(history, config.recent_hits)));
        }
        if !config.must_include.is_empty() {
            chain.push(Box::new(MustInclude::new(config.must_include.clone())));
        }
        log::debug!("filter chain: {:?}", chain.rule_names());
        chain
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn accepts(&self, combo: &Combo) -> bool {
        self.rules.iter().all(|r| r.accepts(combo))
    }

    /// Name of the first rule rejecting `combo`.
    pub fn first_rejection(&self, combo: &Combo) -> Option<&str> {
        self.rules.iter().find(|r| !r.accepts(combo)).map(|r| r.name())
    }

    pub fn filter(&self, combos: impl IntoIterator<Item = Combo>) -> Vec<Combo> {
        let kept: Vec<Combo> = combos.into_iter().filter(|c| self.accepts(c)).collect();
        log::debug!("{} combos pass {} rules", kept.len(), self.rules.len());
        kept
    }
}
