// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one row per epoch to <run dir>/metrics.csv:
//
//   epoch,train_loss,train_acc,val_loss,val_acc
//   1,1.312004,0.412000,1.250331,0.455000
//   2,1.104772,0.530000,1.120918,0.512000
//   ...
//
// The header is written only when the file is new, so a
// resumed run keeps appending to the same log.

use anyhow::{Context, Result};
use burn::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::ml::callbacks::{Callback, EpochLog};
use crate::ml::model::EcgNetwork;

pub const METRICS_FILE: &str = "metrics.csv";
const HEADER: &str = "epoch,train_loss,train_acc,val_loss,val_acc";

pub struct CsvLogger {
    csv_path: PathBuf,
}

impl CsvLogger {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join(METRICS_FILE);
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochLog) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.train_acc, m.val_loss, m.val_acc,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl<B: Backend> Callback<B> for CsvLogger {
    fn on_epoch_end(&mut self, logs: &EpochLog, _model: &EcgNetwork<B>) -> Result<()> {
        self.log(logs)
    }

    fn name(&self) -> &'static str { "CsvLogger" }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn log(epoch: usize) -> EpochLog {
        EpochLog { epoch, train_loss: 1.5, train_acc: 0.25, val_loss: 1.25, val_acc: 0.5 }
    }

    #[test]
    fn test_header_then_rows() {
        let tmp    = tempfile::tempdir().unwrap();
        let logger = CsvLogger::new(tmp.path()).unwrap();
        logger.log(&log(1)).unwrap();
        logger.log(&log(2)).unwrap();

        let text  = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "1,1.500000,0.250000,1.250000,0.500000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_reopen_keeps_existing_rows() {
        let tmp = tempfile::tempdir().unwrap();
        CsvLogger::new(tmp.path()).unwrap().log(&log(1)).unwrap();
        let logger = CsvLogger::new(tmp.path()).unwrap();
        logger.log(&log(2)).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(text.lines().filter(|l| *l == HEADER).count(), 1);
        assert_eq!(text.lines().count(), 3);
    }
}
