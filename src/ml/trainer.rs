// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - Training runs on an AutodiffBackend for gradients
//   - model.valid() returns the model on B::InnerBackend with
//     dropout off; the validation batcher uses the same backend
//   - argmax(1) returns [batch, 1], flattened before .equal()
//
// After each epoch every callback sees the epoch logs and the
// current model; an Err from a callback stops training.

use anyhow::{bail, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::EcgBatcher, dataset::EcgDataset};
use crate::ml::callbacks::{Callback, EpochLog, History};
use crate::ml::model::EcgNetwork;

pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    pub epochs:        usize,
    pub batch_size:    usize,
    pub learning_rate: f64,
    /// 0 = silent, 1 = progress bar + epoch line, 2 = epoch line only
    pub verbose:       u8,
    /// Seed for the per-epoch shuffle of training batches
    pub seed:          u64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs:        200,
            batch_size:    32,
            learning_rate: 1e-3,
            verbose:       1,
            seed:          20,
        }
    }
}

/// Train `network` for `cfg.epochs` epochs and return the per-epoch history.
pub fn fit<B: AutodiffBackend>(
    network:   EcgNetwork<B>,
    train:     EcgDataset,
    val:       EcgDataset,
    cfg:       &FitConfig,
    callbacks: &mut [Box<dyn Callback<B>>],
    device:    &B::Device,
) -> Result<History> {
    if cfg.batch_size == 0 {
        bail!("batch_size must be positive");
    }
    if train.is_empty() || val.is_empty() {
        bail!(
            "need training and validation examples (got {} and {})",
            train.len(),
            val.len()
        );
    }

    let train_examples = train.len();
    let batches_per_epoch = train_examples.div_ceil(cfg.batch_size) as u64;

    let train_loader = DataLoaderBuilder::new(EcgBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train);

    let val_loader = DataLoaderBuilder::new(EcgBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val);

    let mut model = network;
    let mut optim = AdamConfig::new().init::<B, EcgNetwork<B>>();
    let mut history = History::default();

    for cb in callbacks.iter_mut() {
        cb.on_train_begin()?;
    }

    tracing::info!(
        "Training on {} examples for {} epochs (batch_size={}, lr={})",
        train_examples, cfg.epochs, cfg.batch_size, cfg.learning_rate,
    );

    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let bar = progress_bar(cfg.verbose, batches_per_epoch, epoch, cfg.epochs);

        let mut train_loss = Mean::default();
        let mut train_acc  = Accuracy::default();

        for batch in train_loader.iter() {
            let examples = batch.targets.dims()[0];
            let (loss, logits) = model.forward_loss(batch.signals, batch.targets.clone());

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss.add(loss_val, examples);
            train_acc.add(logits, batch.targets);

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);

            if let Some(bar) = &bar {
                bar.set_message(format!("loss={:.4}", train_loss.value()));
                bar.inc(1);
            }
        }
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss = Mean::default();
        let mut val_acc  = Accuracy::default();

        for batch in val_loader.iter() {
            let examples = batch.targets.dims()[0];
            let (loss, logits) = model_valid.forward_loss(batch.signals, batch.targets.clone());
            val_loss.add(loss.into_scalar().elem::<f64>(), examples);
            val_acc.add(logits, batch.targets);
        }

        let logs = EpochLog {
            epoch,
            train_loss: train_loss.value(),
            train_acc:  train_acc.value(),
            val_loss:   val_loss.value(),
            val_acc:    val_acc.value(),
        };

        if cfg.verbose > 0 {
            println!(
                "Epoch {:>3}/{} | loss={:.4} | acc={:.1}% | val_loss={:.4} | val_acc={:.1}%",
                epoch, cfg.epochs,
                logs.train_loss, logs.train_acc * 100.0,
                logs.val_loss, logs.val_acc * 100.0,
            );
        }

        for cb in callbacks.iter_mut() {
            cb.on_epoch_end(&logs, &model)?;
        }
        history.push(logs);
    }

    for cb in callbacks.iter_mut() {
        cb.on_train_end(&history)?;
    }

    tracing::info!("Training complete!");
    Ok(history)
}

fn progress_bar(verbose: u8, batches: u64, epoch: usize, epochs: usize) -> Option<ProgressBar> {
    if verbose != 1 {
        return None;
    }
    let style = ProgressStyle::with_template("{prefix} [{bar:30}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    let bar = ProgressBar::new(batches).with_style(style);
    bar.set_prefix(format!("Epoch {epoch}/{epochs}"));
    Some(bar)
}

/// Per-example mean of batch-mean values; NaN when nothing was added.
#[derive(Default)]
struct Mean {
    sum:      f64,
    examples: usize,
}

impl Mean {
    /// `value` is the mean over a batch of `examples` items.
    fn add(&mut self, value: f64, examples: usize) {
        self.sum      += value * examples as f64;
        self.examples += examples;
    }

    fn value(&self) -> f64 {
        if self.examples > 0 { self.sum / self.examples as f64 } else { f64::NAN }
    }
}

#[derive(Default)]
struct Accuracy {
    correct: usize,
    total:   usize,
}

impl Accuracy {
    fn add<B: Backend>(&mut self, logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) {
        self.total += targets.dims()[0];
        let predicted = logits.argmax(1).flatten::<1>(0, 1);
        let correct: i64 = predicted
            .equal(targets)
            .int().sum().into_scalar().elem::<i64>();
        self.correct += correct as usize;
    }

    fn value(&self) -> f64 {
        if self.total > 0 { self.correct as f64 / self.total as f64 } else { 0.0 }
    }
}
