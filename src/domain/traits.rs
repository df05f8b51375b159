// ============================================================
// Layer 3 — Core Traits
// ============================================================
// The loader only needs "something that yields labelled
// records". The on-disk reference directory implements it;
// tests use an in-memory source.

use anyhow::Result;
use crate::domain::record::EcgRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the full set of labelled records.
pub trait RecordSource {
    /// Load every record from this source, in a stable order.
    fn load_all(&self) -> Result<Vec<EcgRecord>>;

    /// Short human-readable description, used in log lines.
    fn describe(&self) -> String;
}

/// Records already held in memory.
impl RecordSource for Vec<EcgRecord> {
    fn load_all(&self) -> Result<Vec<EcgRecord>> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory records", self.len())
    }
}
