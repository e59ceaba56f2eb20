use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use hitfive_data::models::{Combo, DRAW_SIZE};

use crate::classify::Classification;
use crate::config::MixConfig;
use crate::pool::Pool;

/// Every `k`-element subset of `items`, in lexicographic index order.
pub struct KSubsets<'a> {
    items: &'a [u8],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> KSubsets<'a> {
    pub fn new(items: &'a [u8], k: usize) -> Self {
        Self {
            items,
            indices: (0..k).collect(),
            done: k > items.len(),
        }
    }
}

impl Iterator for KSubsets<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.done {
            return None;
        }
        let current = self.indices.iter().map(|&i| self.items[i]).collect();

        let n = self.items.len();
        let k = self.indices.len();
        // Rightmost index that can still move right.
        match (0..k).rev().find(|&i| self.indices[i] < n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in (i + 1)..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(current)
    }
}

fn to_combo(numbers: &[u8]) -> Option<Combo> {
    let mut combo = Combo::try_from(numbers).ok()?;
    combo.sort_unstable();
    Some(combo)
}

/// Every 5-number combination of the pool, lexicographic.
pub fn pool_combos(pool: &Pool) -> Vec<Combo> {
    let numbers: Vec<u8> = pool.iter().copied().collect();
    KSubsets::new(&numbers, DRAW_SIZE)
        .filter_map(|subset| to_combo(&subset))
        .collect()
}

/// Every combination of `n_hot` hot, `n_warm` warm and `n_cold` cold
/// numbers, each sorted. Empty when the counts do not add up to a draw.
pub fn mixed_combos(classification: &Classification, mix: &MixConfig) -> Vec<Combo> {
    if mix.total() != DRAW_SIZE {
        log::warn!(
            "mix {}/{}/{} does not make {} numbers",
            mix.n_hot,
            mix.n_warm,
            mix.n_cold,
            DRAW_SIZE
        );
        return Vec::new();
    }

    let hot: Vec<Vec<u8>> = KSubsets::new(&classification.hot, mix.n_hot).collect();
    let warm: Vec<Vec<u8>> = KSubsets::new(&classification.warm, mix.n_warm).collect();
    let cold: Vec<Vec<u8>> = KSubsets::new(&classification.cold, mix.n_cold).collect();

    let mut combos = Vec::with_capacity(hot.len() * warm.len() * cold.len());
    for w in &warm {
        for h in &hot {
            for c in &cold {
                let numbers: Vec<u8> = h.iter().chain(w).chain(c).copied().collect();
                if let Some(combo) = to_combo(&numbers) {
                    combos.push(combo);
                }
            }
        }
    }
    log::debug!("{} mixed combos", combos.len());
    combos
}

/// Up to `count` distinct entries of `combos`, reproducible for a given
/// seed, returned in lexicographic order.
pub fn sample_combos(combos: &[Combo], count: usize, seed: u64) -> Vec<Combo> {
    if count >= combos.len() {
        return combos.to_vec();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sample: Vec<Combo> = combos.choose_multiple(&mut rng, count).copied().collect();
    sample.sort_unstable();
    sample
}
