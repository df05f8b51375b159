// ============================================================
// Layer 6 — Run Directory & Model Checkpoint
// ============================================================
// Every run writes into its own folder:
//
//   <save_root>/<net_type>/<run_id>/
//     params.json          ← hyperparameters (no data-dependent fields)
//     model.png            ← network diagram, when it can be drawn
//     05-0.43.mpk          ← best weights so far, epoch 5, val_loss 0.43
//     metrics.csv          ← per-epoch log
//
// run_id is the Unix time in seconds at run start.
//
// Weights use Burn's CompactRecorder (named MessagePack); the file
// extension is whatever that recorder writes.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, FileRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::params::HyperParams;
use crate::ml::callbacks::{Callback, EpochLog};
use crate::ml::model::EcgNetwork;

pub const PARAMS_FILE: &str = "params.json";

/// Integer Unix time in seconds, as a string.
pub fn run_id_now() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// `<save_root>/<net_type>/<start_time>`
pub fn get_folder_name(save_root: impl AsRef<Path>, net_type: &str, start_time: &str) -> PathBuf {
    save_root.as_ref().join(net_type).join(start_time)
}

pub struct RunDirectory {
    dir: PathBuf,
}

impl RunDirectory {
    /// Resolve the run folder and create it. Calling this again with the
    /// same arguments leaves an existing folder untouched.
    pub fn create(save_root: impl AsRef<Path>, net_type: &str, run_id: &str) -> Result<Self> {
        let dir = get_folder_name(save_root, net_type, run_id);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create run directory '{}'", dir.display()))?;
        tracing::debug!("Run directory: '{}'", dir.display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Write `params` to `<dir>/params.json`, replacing any existing file.
    pub fn save_params(&self, params: &HyperParams) -> Result<PathBuf> {
        let path = self.dir.join(PARAMS_FILE);
        let json = serde_json::to_string_pretty(params)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write params to '{}'", path.display()))?;
        tracing::debug!("Saved hyperparameters to '{}'", path.display());
        Ok(path)
    }
}

/// Saves the network whenever val_loss strictly improves on the best seen.
pub struct ModelCheckpoint {
    dir:            PathBuf,
    save_best_only: bool,
    verbose:        u8,
    best:           f64,
    last_saved:     Option<PathBuf>,
}

impl ModelCheckpoint {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir:            dir.into(),
            save_best_only: true,
            verbose:        0,
            best:           f64::INFINITY,
            last_saved:     None,
        }
    }

    pub fn with_save_best_only(mut self, save_best_only: bool) -> Self {
        self.save_best_only = save_best_only;
        self
    }

    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    /// `{epoch:02}-{val_loss:.2}`
    pub fn file_stem(epoch: usize, val_loss: f64) -> String {
        format!("{epoch:02}-{val_loss:.2}")
    }

    /// Path the recorder writes for this epoch, extension included.
    pub fn checkpoint_path<B: Backend>(&self, epoch: usize, val_loss: f64) -> PathBuf {
        let extension = <CompactRecorder as FileRecorder<B>>::file_extension();
        self.dir
            .join(format!("{}.{extension}", Self::file_stem(epoch, val_loss)))
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }

    /// NaN never counts as an improvement.
    fn is_improvement(&self, val_loss: f64) -> bool {
        !val_loss.is_nan() && val_loss < self.best
    }

    fn save<B: Backend>(&self, model: &EcgNetwork<B>, epoch: usize, val_loss: f64) -> Result<PathBuf> {
        // The recorder replaces the last extension with its own, so the
        // path already carries it to keep the decimal point of val_loss.
        let path = self.checkpoint_path::<B>(epoch, val_loss);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        Ok(path)
    }
}

impl<B: Backend> Callback<B> for ModelCheckpoint {
    fn on_epoch_end(&mut self, logs: &EpochLog, model: &EcgNetwork<B>) -> Result<()> {
        let improved = self.is_improvement(logs.val_loss);

        if self.save_best_only && !improved {
            if self.verbose >= 2 {
                tracing::info!(
                    "Epoch {:02}: val_loss did not improve from {:.5}",
                    logs.epoch, self.best,
                );
            }
            return Ok(());
        }

        let path = self.save(model, logs.epoch, logs.val_loss)?;
        if self.verbose >= 2 {
            if improved {
                tracing::info!(
                    "Epoch {:02}: val_loss improved from {:.5} to {:.5}, saving model to '{}'",
                    logs.epoch, self.best, logs.val_loss, path.display(),
                );
            } else {
                tracing::info!(
                    "Epoch {:02}: saving model to '{}'",
                    logs.epoch, path.display(),
                );
            }
        }
        if improved {
            self.best = logs.val_loss;
        }
        self.last_saved = Some(path);
        Ok(())
    }

    fn name(&self) -> &'static str { "ModelCheckpoint" }
}
