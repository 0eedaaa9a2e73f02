// ── Deduplicating error collection ──
//
// The refresh engine runs every few hundred milliseconds, so the same
// failure can be recorded many times between two consumer calls. Each
// category (system info, devices) keeps one ErrorSet: insertion-ordered,
// deduplicated, drained in full on the next consumer call so a transient
// error is reported exactly once.

use std::sync::Mutex;

use indexmap::IndexSet;

/// Insertion-ordered, deduplicating collection of error strings.
#[derive(Debug, Default)]
pub struct ErrorSet {
    entries: Mutex<IndexSet<String>>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error message. Duplicates are ignored; first insertion
    /// order is preserved.
    pub fn push(&self, message: String) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(message);
    }

    /// `true` if any errors are pending.
    pub fn is_empty(&self) -> bool {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.is_empty()
    }

    /// Join all pending messages with `\n` and clear the set.
    ///
    /// Returns `None` when nothing is pending, so the same failure is
    /// never reported twice.
    pub fn drain(&self) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.is_empty() {
            return None;
        }
        let joined = entries
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        entries.clear();
        Some(joined)
    }

    /// Discard all pending entries.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }
}
