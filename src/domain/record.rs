// ============================================================
// Layer 3 — ECG Record Domain Type
// ============================================================
// One labelled recording as read from disk: the record name
// from REFERENCE.csv, its rhythm label, and the raw samples
// already widened to f32.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcgRecord {
    /// Record name, e.g. "A00001"
    pub name: String,

    /// Rhythm class, e.g. "N", "AF", "O"
    pub label: String,

    /// Raw single-lead samples
    pub samples: Vec<f32>,
}

impl EcgRecord {
    pub fn new(name: impl Into<String>, label: impl Into<String>, samples: Vec<f32>) -> Self {
        Self {
            name:  name.into(),
            label: label.into(),
            samples,
        }
    }
}
