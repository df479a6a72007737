#![forbid(unsafe_code)]

//! Bounded dispatch trace with JSONL export.
//!
//! Each line is one [`ModalLogEntry`], e.g.
//! `{"seq":4,"input":"key","phase":"open","index":2,"len":4,"outcome":"applied"}`.

use std::collections::VecDeque;

use crate::controller::ModalLogEntry;

/// Default number of entries retained before the oldest are dropped.
pub const DEFAULT_TRACE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ModalTrace {
    entries: VecDeque<ModalLogEntry>,
    capacity: usize,
    dropped: u64,
}

impl Default for ModalTrace {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TRACE_CAPACITY)
    }
}

impl ModalTrace {
    /// A trace keeping at most `capacity` entries (minimum one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_TRACE_CAPACITY)),
            capacity,
            dropped: 0,
        }
    }

    pub fn record(&mut self, entry: ModalLogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ModalLogEntry> + '_ {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted since creation.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Remove all retained entries and render them as JSONL.
    pub fn drain_jsonl(&mut self) -> String {
        let mut out = String::new();
        for entry in self.entries.drain(..) {
            match serde_json::to_string(&entry) {
                Ok(line) => {
                    out.push_str(&line);
                    out.push('\n');
                }
                Err(err) => {
                    tracing::warn!(
                        target: "folio.modal",
                        seq = entry.seq,
                        %err,
                        "trace entry not serializable"
                    );
                }
            }
        }
        out
    }
}
