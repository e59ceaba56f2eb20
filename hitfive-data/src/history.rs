use crate::models::{validate_draw, Combo, Draw, InvalidDrawError, Universe};

/// Past draws, oldest first: position 0 is the earliest draw.
///
/// When every draw carries a date the history is sorted by date on
/// construction. Undated draws keep the order they were given in, which is
/// taken to be chronological; use [`History::from_newest_first`] for feeds
/// that list the latest draw first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    universe: Universe,
    draws: Vec<Draw>,
}

impl History {
    pub fn new(universe: Universe, mut draws: Vec<Draw>) -> Result<Self, InvalidDrawError> {
        for draw in &draws {
            validate_draw(draw.numbers(), universe)?;
        }
        if !draws.is_empty() && draws.iter().all(|d| d.date().is_some()) {
            draws.sort_by_key(|d| d.date());
        } else if draws.iter().any(|d| d.date().is_some()) {
            let undated = draws.iter().filter(|d| d.date().is_none()).count();
            log::warn!(
                "{} of {} draws have no date, keeping input order (assumed oldest first)",
                undated,
                draws.len()
            );
        }
        Ok(Self { universe, draws })
    }

    pub fn from_newest_first(universe: Universe, mut draws: Vec<Draw>) -> Result<Self, InvalidDrawError> {
        draws.reverse();
        Self::new(universe, draws)
    }

    /// Builds undated draws from raw rows, oldest first.
    pub fn from_rows<I, R>(universe: Universe, rows: I) -> Result<Self, InvalidDrawError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[u8]>,
    {
        let draws = rows
            .into_iter()
            .map(|row| Draw::new(row.as_ref(), universe))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { universe, draws })
    }

    pub fn empty(universe: Universe) -> Self {
        Self {
            universe,
            draws: Vec::new(),
        }
    }

    pub fn universe(&self) -> Universe {
        self.universe
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Draw> {
        self.draws.get(position)
    }

    pub fn latest(&self) -> Option<&Draw> {
        self.draws.last()
    }

    /// The last `n` draws (all of them if the history is shorter).
    pub fn tail(&self, n: usize) -> &[Draw] {
        let start = self.draws.len().saturating_sub(n);
        &self.draws[start..]
    }

    /// `None` means the whole history.
    pub fn window(&self, window: Option<usize>) -> &[Draw] {
        match window {
            Some(w) => self.tail(w),
            None => &self.draws,
        }
    }

    pub fn combos(&self) -> impl Iterator<Item = &Combo> + '_ {
        self.draws.iter().map(|d| d.numbers())
    }
}
