use std::collections::VecDeque;

use crate::model::NewsRecord;

/// Bounded, newest-first working set of headlines for cyclic display.
///
/// Seeded from a one-time fetch, then fed by the live stream; a cursor marks
/// the currently displayed entry and advances on a fixed cadence, wrapping
/// around. Duplicate deliveries are kept as-is, no deduplication by id.
pub struct TickerBuffer {
    cap: usize,
    items: VecDeque<NewsRecord>,
    cursor: usize,
}

impl TickerBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            items: VecDeque::with_capacity(cap),
            cursor: 0,
        }
    }

    /// Replace the contents with a fetched batch, newest first. The cursor is
    /// deliberately left where it was; if the new list is shorter, the next
    /// rotation tick folds it back into range.
    pub fn seed<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = NewsRecord>,
    {
        self.items.clear();
        self.items.extend(records.into_iter().take(self.cap));
    }

    /// Insert a freshly pushed record at the front, evicting from the tail
    /// once over capacity. The cursor is left alone; an out-of-range cursor
    /// is folded back into range on the next rotation tick.
    pub fn prepend(&mut self, record: NewsRecord) {
        self.items.push_front(record);
        while self.items.len() > self.cap {
            self.items.pop_back();
        }
    }

    /// Advance the cursor one step, wrapping. A no-op on an empty buffer.
    pub fn rotate(&mut self) -> Option<&NewsRecord> {
        if self.items.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.items.len();
        self.items.get(self.cursor)
    }

    /// Manual selection: move the cursor immediately. The rotation timer is
    /// not reset; the next tick advances from here.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.cursor = index;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&NewsRecord> {
        self.items.get(self.cursor)
    }

    /// One-based cursor position and total, for "3 of 8" style display.
    pub fn position(&self) -> (usize, usize) {
        let len = self.items.len();
        if len == 0 {
            (0, 0)
        } else {
            (self.cursor.min(len - 1) + 1, len)
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &NewsRecord> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, title: &str, created_ms: i64) -> NewsRecord {
        NewsRecord {
            key: format!("{id:024x}"),
            id,
            title: title.into(),
            category: "Technology".into(),
            details: "details".into(),
            created_at: Utc.timestamp_millis_opt(created_ms).unwrap(),
        }
    }

    #[test]
    fn prepend_evicts_oldest_beyond_cap() {
        let mut buffer = TickerBuffer::new(3);
        buffer.seed(vec![
            record(1, "A", 10),
            record(2, "B", 9),
            record(3, "C", 8),
        ]);

        buffer.prepend(record(4, "D", 11));

        let titles: Vec<_> = buffer.items().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["D", "A", "B"]);
    }

    #[test]
    fn cap_holds_under_many_prepends() {
        let mut buffer = TickerBuffer::new(8);
        for i in 0..100 {
            buffer.prepend(record(i, "headline", i));
            assert!(buffer.len() <= 8);
        }
        assert_eq!(buffer.len(), 8);
        // Newest first.
        assert_eq!(buffer.items().next().unwrap().id, 99);
    }

    #[test]
    fn rotation_on_empty_buffer_is_noop() {
        let mut buffer = TickerBuffer::new(8);
        assert!(buffer.rotate().is_none());
        assert!(buffer.current().is_none());
        assert_eq!(buffer.position(), (0, 0));
    }

    #[test]
    fn rotation_wraps_and_keeps_cursor_in_range() {
        let mut buffer = TickerBuffer::new(8);
        buffer.seed(vec![
            record(1, "A", 3),
            record(2, "B", 2),
            record(3, "C", 1),
        ]);

        assert_eq!(buffer.rotate().unwrap().title, "B");
        assert_eq!(buffer.rotate().unwrap().title, "C");
        assert_eq!(buffer.rotate().unwrap().title, "A");
        assert_eq!(buffer.position(), (1, 3));
    }

    #[test]
    fn manual_selection_overrides_cursor() {
        let mut buffer = TickerBuffer::new(8);
        buffer.seed(vec![
            record(1, "A", 3),
            record(2, "B", 2),
            record(3, "C", 1),
        ]);

        assert!(buffer.select(2));
        assert_eq!(buffer.current().unwrap().title, "C");
        // Next tick continues from the selected position.
        assert_eq!(buffer.rotate().unwrap().title, "A");
        // Out-of-range selection is refused.
        assert!(!buffer.select(3));
    }

    #[test]
    fn cursor_recovers_after_buffer_shrinks() {
        let mut buffer = TickerBuffer::new(8);
        buffer.seed(vec![
            record(1, "A", 5),
            record(2, "B", 4),
            record(3, "C", 3),
            record(4, "D", 2),
            record(5, "E", 1),
        ]);
        buffer.select(4);

        // Refetch came back with fewer items; the stale cursor folds back
        // into range on the next tick.
        buffer.seed(vec![record(6, "F", 7), record(7, "G", 6)]);
        let current = buffer.rotate().expect("non-empty buffer");
        assert_eq!(current.title, "G");
        let (pos, len) = buffer.position();
        assert!(pos >= 1 && pos <= len);
    }

    #[test]
    fn duplicates_are_retained_verbatim() {
        let mut buffer = TickerBuffer::new(4);
        buffer.prepend(record(1, "A", 1));
        buffer.prepend(record(1, "A", 1));
        assert_eq!(buffer.len(), 2);
    }
}
