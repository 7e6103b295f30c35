//! Bounded contents of the log pane.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

pub const DEFAULT_CAPACITY: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Discovery,
    Playback,
    App,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub source: LogSource,
    pub text: String,
}

#[derive(Debug)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    /// Total entries ever pushed; lets the log pane notice new lines even
    /// once the buffer is full.
    pushed: u64,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(256)),
            capacity: capacity.max(1),
            pushed: 0,
        }
    }

    pub fn push(&mut self, source: LogSource, text: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            at: Local::now(),
            source,
            text: text.into(),
        });
        self.pushed += 1;
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pushed(&self) -> u64 {
        self.pushed
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oldest_entries_drop_at_capacity() {
        let mut log = LogBuffer::new(2);
        log.push(LogSource::App, "one");
        log.push(LogSource::Discovery, "two");
        log.push(LogSource::Playback, "three");

        let texts: Vec<&str> = log.entries().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(log.pushed(), 3);
        assert_eq!(log.last().map(|e| e.source), Some(LogSource::Playback));
    }
}
