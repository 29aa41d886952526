//! Precedence policy for competing candidates
//!
//! Several places in the pipeline have to pick one authoritative source out
//! of many: which log stream of a job to read, which best-result block of a
//! log to parse. Both are expressed with the same rule:
//!
//! - every candidate carries a rank,
//! - the highest rank wins,
//! - among equal ranks the candidate that came **later** in input order wins.
//!
//! "Last block wins" is the degenerate case where all ranks are equal.

/// An ordered list of candidates with a single deterministic tie-break rule.
#[derive(Debug, Clone)]
pub struct Precedence<T, R> {
    candidates: Vec<(R, T)>,
}

impl<T, R: Ord> Default for Precedence<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R: Ord> Precedence<T, R> {
    /// Create an empty candidate list
    #[must_use]
    pub const fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Offer a candidate with its rank
    pub fn offer(&mut self, rank: R, candidate: T) {
        self.candidates.push((rank, candidate));
    }

    /// Number of candidates offered
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True if nothing was offered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Resolve to the authoritative candidate, if any.
    ///
    /// `max_by` returns the last maximum, which is exactly the
    /// "later wins a tie" rule.
    #[must_use]
    pub fn resolve(self) -> Option<T> {
        self.candidates
            .into_iter()
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, candidate)| candidate)
    }
}

impl<T, R: Ord> FromIterator<(R, T)> for Precedence<T, R> {
    fn from_iter<I: IntoIterator<Item = (R, T)>>(iter: I) -> Self {
        Self {
            candidates: iter.into_iter().collect(),
        }
    }
}

/// Pick the last element of an ordered sequence (all candidates ranked equal).
#[must_use]
pub fn last_wins<T>(ordered: impl IntoIterator<Item = T>) -> Option<T> {
    ordered
        .into_iter()
        .map(|candidate| ((), candidate))
        .collect::<Precedence<T, ()>>()
        .resolve()
}
