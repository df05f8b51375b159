// ============================================================
// Layer 4 — Reference Directory Reader
// ============================================================
// Reads the raw dataset layout:
//
//   <data_path>/
//     REFERENCE.csv      ← "<record>,<label>" per line, no header
//     A00001.ecg         ← little-endian i16 samples
//     A00002.ecg
//     ...
//
// Every record listed in REFERENCE.csv must exist. A missing or
// truncated .ecg file is an error, not a skip.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::record::EcgRecord;
use crate::domain::traits::RecordSource;

pub const REFERENCE_FILE: &str = "REFERENCE.csv";
pub const RECORD_EXTENSION: &str = "ecg";

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    record: String,
    label:  String,
}

/// A directory laid out as above.
pub struct ReferenceDirectory {
    dir: PathBuf,
}

impl ReferenceDirectory {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    fn read_reference(&self) -> Result<Vec<ReferenceRow>> {
        let path = self.dir.join(REFERENCE_FILE);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(&path)
            .with_context(|| format!("Cannot open '{}'", path.display()))?;

        let mut rows = Vec::new();
        for (line, row) in reader.deserialize::<ReferenceRow>().enumerate() {
            let row = row.with_context(|| {
                format!("Malformed line {} in '{}'", line + 1, path.display())
            })?;
            rows.push(row);
        }
        Ok(rows)
    }
}

impl RecordSource for ReferenceDirectory {
    fn load_all(&self) -> Result<Vec<EcgRecord>> {
        let rows = self.read_reference()?;
        tracing::info!("{} lists {} records", REFERENCE_FILE, rows.len());

        rows.into_iter()
            .map(|row| {
                let path = self.dir.join(format!("{}.{}", row.record, RECORD_EXTENSION));
                let samples = read_samples(&path)?;
                tracing::debug!("Loaded: {} ({} samples, label {})", row.record, samples.len(), row.label);
                Ok(EcgRecord::new(row.record, row.label, samples))
            })
            .collect()
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Decode a raw little-endian i16 file.
pub fn read_samples(path: &Path) -> Result<Vec<f32>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    if bytes.len() % 2 != 0 {
        bail!(
            "'{}' has an odd byte length ({}); expected 16-bit samples",
            path.display(),
            bytes.len()
        );
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32)
        .collect())
}

/// Encode samples the way `read_samples` expects them.
#[cfg(test)]
pub fn write_samples(path: &Path, samples: &[i16]) -> Result<()> {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    fs::write(path, bytes).with_context(|| format!("Cannot write '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_reference_and_records() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(REFERENCE_FILE), "A00001,N\nA00002, AF\n").unwrap();
        write_samples(&dir.path().join("A00001.ecg"), &[1, -2, 3]).unwrap();
        write_samples(&dir.path().join("A00002.ecg"), &[i16::MIN, i16::MAX]).unwrap();

        let records = ReferenceDirectory::new(dir.path()).load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].samples, vec![1.0, -2.0, 3.0]);
        assert_eq!(records[1].label, "AF");
        assert_eq!(records[1].samples, vec![-32768.0, 32767.0]);
    }

    #[test]
    fn test_missing_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(REFERENCE_FILE), "A00001,N\n").unwrap();
        let err = ReferenceDirectory::new(dir.path()).load_all().unwrap_err();
        assert!(format!("{err:#}").contains("A00001.ecg"));
    }

    #[test]
    fn test_missing_reference_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ReferenceDirectory::new(dir.path().join("nope")).load_all().is_err());
    }

    #[test]
    fn test_odd_length_rejected() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ecg");
        fs::write(&path, [0u8, 1, 2]).unwrap();
        assert!(read_samples(&path).is_err());
    }
}
