//! Monotonic boundary search driven by an external predicate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("binary search result read before the boundary was found")]
    NotFound,
}

/// Finds the least `m` in `[low, high)` for which a predicate holds.
///
/// The predicate must be false below the boundary and true from it on. The
/// caller drives the search:
///
/// ```
/// use retouch::verify::BinarySearch;
///
/// let mut search = BinarySearch::new(0, 5);
/// while !search.found() {
///     let candidate = search.get_next();
///     search.respond(candidate > 2);
/// }
/// assert_eq!(search.result(), Ok(3));
/// ```
///
/// `low` is queried first, so a predicate that already holds there costs one
/// evaluation. If it never holds the result is `high`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarySearch {
    low: usize,
    /// Largest index known false, plus one
    lo: usize,
    /// Smallest index known true
    hi: usize,
    next: usize,
    result: Option<usize>,
}

impl BinarySearch {
    pub fn new(low: usize, high: usize) -> Self {
        debug_assert!(low <= high, "low {low} > high {high}");
        let result = (low >= high).then_some(high);
        Self {
            low,
            lo: low,
            hi: high,
            next: low,
            result,
        }
    }

    /// Index to evaluate the predicate at next.
    pub fn get_next(&self) -> usize {
        self.next
    }

    /// Report the predicate's value at the index returned by [`get_next`](Self::get_next).
    pub fn respond(&mut self, value: bool) {
        if self.result.is_some() {
            return;
        }
        let candidate = self.next;
        if value {
            if candidate == self.low {
                self.result = Some(self.low);
                return;
            }
            self.hi = candidate;
        } else {
            self.lo = candidate + 1;
        }

        if self.lo >= self.hi {
            self.result = Some(self.lo);
        } else {
            self.next = (self.lo + self.hi) / 2;
        }
    }

    pub fn found(&self) -> bool {
        self.result.is_some()
    }

    /// The boundary, once [`found`](Self::found) is true.
    pub fn result(&self) -> Result<usize, SearchError> {
        self.result.ok_or(SearchError::NotFound)
    }
}
