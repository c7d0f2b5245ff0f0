//! Replay buffer: ordered accumulator for one query execution.
//!
//! ```text
//! Unstarted ──begin──> Accumulating ──seal──> Sealed
//!     │                     │                   │
//!     └──────── close ──────┴────── close ──────┴──> Closed
//! ```
//!
//! `seal` hands out the rows exactly once; that single hand-off is what
//! limits persistence to one save per seal transition.

use crate::value::Row;

/// Lifecycle state of a [`ReplayBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// No fetch attempted yet.
    Unstarted,
    /// Fetching started; rows are being appended.
    Accumulating,
    /// Result complete and handed to the cache writer.
    Sealed,
    /// Cursor closed; contents discarded.
    Closed,
}

impl BufferState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Accumulating => "accumulating",
            Self::Sealed => "sealed",
            Self::Closed => "closed",
        }
    }

    /// True once no further rows will be taken from the live cursor.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Sealed | Self::Closed)
    }
}

#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    rows: Option<Vec<Row>>,
    state: BufferState,
}

impl Default for ReplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: None,
            state: BufferState::Unstarted,
        }
    }

    #[must_use]
    pub const fn state(&self) -> BufferState {
        self.state
    }

    /// Number of buffered rows (0 while unstarted or closed).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffered rows; `None` while unstarted or after close.
    #[must_use]
    pub fn rows(&self) -> Option<&[Row]> {
        self.rows.as_deref()
    }

    /// Mark the first fetch attempt: the buffer becomes empty but started.
    pub fn begin(&mut self) {
        if self.state == BufferState::Unstarted {
            self.rows = Some(Vec::new());
            self.state = BufferState::Accumulating;
        }
    }

    /// Append one row. Ignored unless accumulating.
    pub fn push(&mut self, row: Row) {
        self.begin();
        if self.state == BufferState::Accumulating
            && let Some(rows) = self.rows.as_mut()
        {
            rows.push(row);
        }
    }

    /// Replace the whole content (bulk path). Ignored once finished.
    ///
    /// Returns how many previously buffered rows were superseded.
    pub fn replace(&mut self, rows: Vec<Row>) -> usize {
        if self.state.is_finished() {
            return 0;
        }
        let superseded = self.len();
        self.rows = Some(rows);
        self.state = BufferState::Accumulating;
        superseded
    }

    /// Seal the buffer, returning its rows on the first call only.
    pub fn seal(&mut self) -> Option<&[Row]> {
        match self.state {
            BufferState::Unstarted | BufferState::Accumulating => {
                self.state = BufferState::Sealed;
                Some(self.rows.get_or_insert_with(Vec::new).as_slice())
            }
            BufferState::Sealed | BufferState::Closed => None,
        }
    }

    /// Discard content without sealing.
    pub fn close(&mut self) {
        self.rows = None;
        self.state = BufferState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn row(id: i64) -> Row {
        Row::from_pairs([("id", Value::Int(id))])
    }

    #[test]
    fn test_unstarted_is_distinct_from_empty() {
        let mut buffer = ReplayBuffer::new();
        assert_eq!(buffer.state(), BufferState::Unstarted);
        assert!(buffer.rows().is_none());

        buffer.begin();
        assert_eq!(buffer.state(), BufferState::Accumulating);
        assert_eq!(buffer.rows(), Some(&[][..]));
    }

    #[test]
    fn test_push_keeps_order() {
        let mut buffer = ReplayBuffer::new();
        buffer.push(row(1));
        buffer.push(row(2));
        buffer.push(row(3));
        let ids: Vec<_> = buffer
            .rows()
            .unwrap()
            .iter()
            .map(|r| r.get("id").and_then(Value::as_i64).unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_seal_hands_out_rows_once() {
        let mut buffer = ReplayBuffer::new();
        buffer.push(row(1));
        assert_eq!(buffer.seal().map(<[Row]>::len), Some(1));
        assert!(buffer.seal().is_none());
        assert_eq!(buffer.state(), BufferState::Sealed);
    }

    #[test]
    fn test_seal_empty_yields_empty_sequence() {
        let mut buffer = ReplayBuffer::new();
        buffer.begin();
        assert_eq!(buffer.seal(), Some(&[][..]));
    }

    #[test]
    fn test_push_after_seal_is_ignored() {
        let mut buffer = ReplayBuffer::new();
        buffer.push(row(1));
        buffer.seal();
        buffer.push(row(2));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_replace_reports_superseded() {
        let mut buffer = ReplayBuffer::new();
        buffer.push(row(1));
        buffer.push(row(2));
        let superseded = buffer.replace(vec![row(3)]);
        assert_eq!(superseded, 2);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_close_discards_without_seal() {
        let mut buffer = ReplayBuffer::new();
        buffer.push(row(1));
        buffer.close();
        assert_eq!(buffer.state(), BufferState::Closed);
        assert!(buffer.rows().is_none());
        assert!(buffer.seal().is_none());
        assert_eq!(buffer.replace(vec![row(2)]), 0);
        assert!(buffer.rows().is_none());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(BufferState::Sealed.as_str(), "sealed");
        assert!(BufferState::Closed.is_finished());
        assert!(!BufferState::Accumulating.is_finished());
    }
}
