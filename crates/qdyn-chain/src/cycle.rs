use qdyn_core::{ErrorInfo, QdynError};

/// Cyclic selector over a fixed, ordered pattern list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternCycle {
    cursor: usize,
    period: usize,
}

impl PatternCycle {
    /// Creates a cycle of length `period` positioned at `cursor`.
    pub fn new(cursor: usize, period: usize) -> Result<Self, QdynError> {
        if cursor >= period {
            return Err(QdynError::Invariant(
                ErrorInfo::new("cursor-range", "pattern cursor outside the pattern list")
                    .with_context("cursor", cursor.to_string())
                    .with_context("patterns", period.to_string()),
            ));
        }
        Ok(Self { cursor, period })
    }

    /// Returns the current pattern index and advances the cursor modulo the period.
    pub fn next_index(&mut self) -> usize {
        let current = self.cursor;
        self.cursor = (self.cursor + 1) % self.period;
        current
    }

    /// Index the next call to [`next_index`](Self::next_index) will return.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of patterns in the cycle.
    pub fn period(&self) -> usize {
        self.period
    }
}
