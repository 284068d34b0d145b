use serde::Serialize;

/// Outcome of one timestamp-gated upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
    /// Incoming stamp was not strictly later; nothing changed
    Stale,
    /// Record had no id
    Skipped,
}

/// Tally of one merge. Stale updates are expected, not errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub inserted: usize,
    pub updated: usize,
    pub stale: usize,
}

impl MergeReport {
    pub fn record(&mut self, upsert: Upsert) {
        match upsert {
            Upsert::Inserted => self.inserted += 1,
            Upsert::Updated => self.updated += 1,
            Upsert::Stale => self.stale += 1,
            Upsert::Skipped => {}
        }
    }

    pub fn changed(&self) -> bool {
        self.inserted + self.updated > 0
    }
}
