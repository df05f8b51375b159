// ============================================================
// Layer 5 — Training Callbacks
// ============================================================
// Hooks the training loop calls at fixed points:
//
//   on_train_begin  → once, before the first epoch
//   on_epoch_end    → after validation, with the epoch logs
//                     and the current model
//   on_train_end    → once, with the full history
//
// All hooks default to no-ops. An Err from any hook stops
// training and propagates to the caller.

use anyhow::Result;
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ml::model::EcgNetwork;

/// Metrics for one finished epoch. `epoch` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochLog {
    pub epoch:      usize,
    pub train_loss: f64,
    pub train_acc:  f64,
    pub val_loss:   f64,
    pub val_acc:    f64,
}

/// Per-epoch logs, in order.
#[derive(Debug, Clone, Default)]
pub struct History {
    pub epochs: Vec<EpochLog>,
}

impl History {
    pub fn push(&mut self, log: EpochLog) {
        self.epochs.push(log);
    }

    /// Epoch with the lowest finite val_loss; the earliest one wins ties.
    pub fn best_epoch(&self) -> Option<&EpochLog> {
        self.epochs
            .iter()
            .filter(|e| !e.val_loss.is_nan())
            .fold(None, |best: Option<&EpochLog>, e| match best {
                Some(b) if b.val_loss <= e.val_loss => Some(b),
                _ => Some(e),
            })
    }

    pub fn len(&self) -> usize { self.epochs.len() }

    pub fn is_empty(&self) -> bool { self.epochs.is_empty() }
}

pub trait Callback<B: Backend> {
    fn on_train_begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_epoch_end(&mut self, _logs: &EpochLog, _model: &EcgNetwork<B>) -> Result<()> {
        Ok(())
    }

    fn on_train_end(&mut self, _history: &History) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}
