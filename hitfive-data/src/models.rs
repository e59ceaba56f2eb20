use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Numbers drawn per game.
pub const DRAW_SIZE: usize = 5;

/// Hit 5 draws from 1..=42.
pub const DEFAULT_MAX: u8 = 42;

/// A sorted set of `DRAW_SIZE` numbers: a past draw or a candidate ticket.
pub type Combo = [u8; DRAW_SIZE];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDrawError {
    #[error("expected {expected} numbers, got {0}", expected = DRAW_SIZE)]
    WrongCount(usize),
    #[error("number {number} outside 1..={max}")]
    OutOfRange { number: u8, max: u8 },
    #[error("duplicate number: {0}")]
    Duplicate(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("universe 1..={0} cannot hold a draw of {size} numbers", size = DRAW_SIZE)]
pub struct UniverseError(pub u8);

/// The range of drawable numbers, `1..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Universe {
    max: u8,
}

impl Universe {
    pub fn new(max: u8) -> Result<Self, UniverseError> {
        if (max as usize) < DRAW_SIZE {
            return Err(UniverseError(max));
        }
        Ok(Self { max })
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn size(&self) -> usize {
        self.max as usize
    }

    pub fn contains(&self, number: u8) -> bool {
        number >= 1 && number <= self.max
    }

    /// All numbers in ascending order.
    pub fn numbers(&self) -> std::ops::RangeInclusive<u8> {
        1..=self.max
    }

    /// Zero-based slot of `number` in per-number tables.
    pub fn index(&self, number: u8) -> usize {
        (number - 1) as usize
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self { max: DEFAULT_MAX }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Draw {
    numbers: Combo,
    date: Option<NaiveDate>,
}

impl Draw {
    pub fn new(numbers: &[u8], universe: Universe) -> Result<Self, InvalidDrawError> {
        Ok(Self {
            numbers: validate_draw(numbers, universe)?,
            date: None,
        })
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sorted ascending.
    pub fn numbers(&self) -> &Combo {
        &self.numbers
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.binary_search(&number).is_ok()
    }

    pub fn sum(&self) -> u32 {
        self.numbers.iter().map(|&n| n as u32).sum()
    }
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_combo(&self.numbers))
    }
}

/// Checks count, range and uniqueness, returning the numbers sorted.
pub fn validate_draw(numbers: &[u8], universe: Universe) -> Result<Combo, InvalidDrawError> {
    if numbers.len() != DRAW_SIZE {
        return Err(InvalidDrawError::WrongCount(numbers.len()));
    }
    for &n in numbers {
        if !universe.contains(n) {
            return Err(InvalidDrawError::OutOfRange {
                number: n,
                max: universe.max(),
            });
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                return Err(InvalidDrawError::Duplicate(numbers[i]));
            }
        }
    }

    let mut combo = [0u8; DRAW_SIZE];
    combo.copy_from_slice(numbers);
    combo.sort();
    Ok(combo)
}

pub fn format_combo(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}
