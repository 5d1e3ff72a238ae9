use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded linear history of full-surface snapshots.
///
/// `cursor` is `None` only while the log is empty; otherwise it indexes the
/// snapshot currently shown.
#[derive(Debug)]
pub struct HistoryLog {
    entries: Vec<String>,
    cursor: Option<usize>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&str> {
        self.cursor.map(|i| self.entries[i].as_str())
    }

    /// Record a snapshot (drops the redo branch). Returns false when the
    /// snapshot equals the current one and nothing was recorded.
    pub fn record(&mut self, snapshot: String) -> bool {
        if self.current() == Some(snapshot.as_str()) {
            return false;
        }

        let keep = self.cursor.map_or(0, |i| i + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);
        let mut cursor = self.entries.len() - 1;

        if self.entries.len() > self.capacity {
            self.entries.remove(0);
            cursor -= 1;
            debug!(capacity = self.capacity, "evicted oldest snapshot");
        }
        self.cursor = Some(cursor);
        true
    }

    /// Step back one snapshot and return it
    pub fn undo(&mut self) -> Option<&str> {
        match self.cursor {
            Some(i) if i > 0 => {
                self.cursor = Some(i - 1);
                self.current()
            }
            _ => None,
        }
    }

    /// Step forward one snapshot and return it
    pub fn redo(&mut self) -> Option<&str> {
        match self.cursor {
            Some(i) if i + 1 < self.entries.len() => {
                self.cursor = Some(i + 1);
                self.current()
            }
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.map_or(false, |i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(false, |i| i + 1 < self.entries.len())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(i: usize) -> String {
        format!("<surface>{}</surface>", i)
    }

    fn filled(n: usize, capacity: usize) -> HistoryLog {
        let mut log = HistoryLog::new(capacity);
        for i in 0..n {
            assert!(log.record(snap(i)));
        }
        log
    }

    #[test]
    fn test_empty_log() {
        let mut log = HistoryLog::default();
        assert_eq!(log.cursor(), None);
        assert_eq!(log.capacity(), DEFAULT_CAPACITY);
        assert!(log.undo().is_none());
        assert!(log.redo().is_none());
        assert!(log.current().is_none());
    }

    #[test]
    fn test_undo_back_to_first_then_stops() {
        let n = 10;
        let mut log = filled(n, DEFAULT_CAPACITY);
        // n snapshots give n - 1 steps back to the first
        for _ in 0..n - 1 {
            assert!(log.undo().is_some());
        }
        assert_eq!(log.current(), Some(snap(0).as_str()));
        assert!(log.undo().is_none());
        assert_eq!(log.cursor(), Some(0));
    }

    #[test]
    fn test_duplicate_not_recorded() {
        let mut log = filled(3, DEFAULT_CAPACITY);
        assert!(!log.record(snap(2)));
        assert_eq!(log.len(), 3);
        assert_eq!(log.cursor(), Some(2));
        // only consecutive duplicates are dropped
        assert!(log.record(snap(1)));
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = filled(51, 50);
        assert_eq!(log.len(), 50);
        assert_eq!(log.cursor(), Some(49));

        while log.undo().is_some() {}
        assert_eq!(log.current(), Some(snap(1).as_str()));
    }

    #[test]
    fn test_undo_then_redo_returns_same() {
        let mut log = filled(4, DEFAULT_CAPACITY);
        log.undo();
        let before = log.current().map(str::to_string);
        log.undo();
        let redone = log.redo().map(str::to_string);
        assert_eq!(redone, before);
    }

    #[test]
    fn test_record_after_undo_discards_redo_branch() {
        let mut log = filled(5, DEFAULT_CAPACITY);
        log.undo();
        log.undo();
        assert!(log.can_redo());

        log.record("new".to_string());
        assert_eq!(log.len(), 4);
        assert!(!log.can_redo());
        assert!(log.redo().is_none());
        assert_eq!(log.current(), Some("new"));
    }

    #[test]
    fn test_eviction_after_undo_keeps_position() {
        let mut log = filled(3, 3);
        log.undo();
        // truncates to [0, 1], appends, stays within capacity
        log.record("x".to_string());
        assert_eq!(log.len(), 3);
        assert_eq!(log.cursor(), Some(2));
        log.record("y".to_string());
        assert_eq!(log.len(), 3);
        assert_eq!(log.cursor(), Some(2));
        assert_eq!(log.undo(), Some("x"));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut log = HistoryLog::new(0);
        log.record("a".to_string());
        log.record("b".to_string());
        assert_eq!(log.len(), 1);
        assert_eq!(log.current(), Some("b"));
        assert!(!log.can_undo());
    }
}
