// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates one training run in order:
//
//   Step 1: Load the train/validation split  (Layer 4 - data)
//   Step 2: Append the channel axis          (Layer 4 - data)
//   Step 3: Create run dir, save params      (Layer 6 - infra)
//   Step 4: Build the network                (Layer 5 - ml)
//   Step 5: Draw the network, best-effort    (Layer 6 - infra)
//   Step 6: Register callbacks               (Layer 5/6)
//   Step 7: Run the training loop            (Layer 5 - ml)

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{
    dataset::{with_channel_axis, EcgDataset},
    loader::{Loader, LoaderConfig},
};
use crate::domain::params::HyperParams;
use crate::infra::{
    checkpoint::{run_id_now, ModelCheckpoint, RunDirectory},
    diagram::{render_diagram, DiagramError, DIAGRAM_FILE},
    metrics::CsvLogger,
};
use crate::ml::{
    callbacks::{Callback, History},
    model::{build_network, describe, LayerSummary},
    trainer::{fit, FitConfig, TrainBackend},
};

// ─── Training Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:     String,
    /// Rebuild the dataset cache instead of reusing it
    pub refresh:       bool,
    pub save_dir:      String,
    pub net_type:      String,
    pub epochs:        usize,
    pub batch_size:    usize,
    pub learning_rate: f64,
    pub verbose:       u8,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:     String::new(),
            refresh:       false,
            save_dir:      "./saved".to_string(),
            net_type:      "conv".to_string(),
            epochs:        200,
            batch_size:    32,
            learning_rate: 1e-3,
            verbose:       1,
        }
    }
}

/// What a finished run leaves behind.
pub struct TrainOutcome {
    pub history: History,
    pub run_dir: PathBuf,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run on the default WGPU device.
    pub fn execute(&self) -> Result<TrainOutcome> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.execute_on::<TrainBackend>(&device)
    }

    pub fn execute_on<B: AutodiffBackend>(&self, device: &B::Device) -> Result<TrainOutcome> {
        let cfg = &self.config;

        // ── Step 1: Load the split (cached unless refresh) ───────────────────
        let loader = Loader::new(&cfg.data_path, true, !cfg.refresh)
            .with_context(|| format!("Failed to load data from '{}'", cfg.data_path))?;
        println!("Training size: {} examples.", loader.x_train.nrows());
        println!("Validation size: {} examples.", loader.x_test.nrows());

        // ── Step 2: [examples, timesteps] → [examples, timesteps, 1] ─────────
        let x_train = with_channel_axis(loader.x_train);
        let x_test  = with_channel_axis(loader.x_test);
        let train   = EcgDataset::from_arrays(&x_train, &loader.y_train, loader.one_hot)?;
        let val     = EcgDataset::from_arrays(&x_test, &loader.y_test, loader.one_hot)?;

        // ── Step 3: Run directory and params.json ─────────────────────────────
        // params.json is written before the data-dependent fields are known.
        let run_dir = RunDirectory::create(&cfg.save_dir, &cfg.net_type, &run_id_now())?;
        let hyper   = HyperParams::default();
        run_dir.save_params(&hyper)?;

        // ── Step 4: Build the network ─────────────────────────────────────────
        let params  = hyper.with_data([train.timesteps(), 1], loader.output_dim);
        let layers  = describe(&params)?;
        let network = build_network::<B>(&params, device)?;
        for layer in &layers {
            tracing::info!("{layer}");
        }

        // ── Step 5: Diagram (never fatal) ─────────────────────────────────────
        try_render_diagram(&layers, run_dir.path());

        // ── Step 6: Callbacks ─────────────────────────────────────────────────
        let mut callbacks: Vec<Box<dyn Callback<B>>> = vec![
            Box::new(ModelCheckpoint::new(run_dir.path()).with_verbose(2)),
            Box::new(CsvLogger::new(run_dir.path())?),
        ];

        // ── Step 7: Train ─────────────────────────────────────────────────────
        let fit_cfg = FitConfig {
            epochs:        cfg.epochs,
            batch_size:    cfg.batch_size,
            learning_rate: cfg.learning_rate,
            verbose:       cfg.verbose,
            seed:          LoaderConfig::default().seed,
        };
        let history = fit(network, train, val, &fit_cfg, &mut callbacks, device)?;

        Ok(TrainOutcome { history, run_dir: run_dir.path().to_path_buf() })
    }
}

/// Draw `<dir>/model.png`. Returns whether a diagram was written.
fn try_render_diagram(layers: &[LayerSummary], dir: &Path) -> bool {
    report_diagram(render_diagram(layers, &dir.join(DIAGRAM_FILE)))
}

fn report_diagram(result: Result<(), DiagramError>) -> bool {
    match result {
        Ok(()) => true,
        Err(DiagramError::Unavailable) => {
            println!("Skipping plot: diagram support not compiled in.");
            false
        }
        Err(e @ DiagramError::Render(_)) => {
            tracing::warn!("Skipping plot: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference::{write_samples, REFERENCE_FILE};
    use crate::infra::{checkpoint::PARAMS_FILE, metrics::METRICS_FILE};
    use std::fs;

    type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    /// Four records of two default-length windows each.
    fn write_records(dir: &Path) {
        let mut reference = String::new();
        for (i, label) in ["N", "A", "N", "A"].iter().enumerate() {
            let name = format!("R{i}");
            reference.push_str(&format!("{name},{label}\n"));
            let samples: Vec<i16> = (0..4000)
                .map(|t| ((t as f32 * 0.01 * (i + 1) as f32).sin() * 500.0) as i16)
                .collect();
            write_samples(&dir.join(format!("{name}.ecg")), &samples).unwrap();
        }
        fs::write(dir.join(REFERENCE_FILE), reference).unwrap();
    }

    #[test]
    fn test_defaults() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.save_dir, "./saved");
        assert_eq!(cfg.net_type, "conv");
        assert_eq!(cfg.epochs, 200);
        assert!(!cfg.refresh);
    }

    #[cfg(not(feature = "plot"))]
    #[test]
    fn test_missing_diagram_support_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!try_render_diagram(&[], tmp.path()));
        assert!(!tmp.path().join(DIAGRAM_FILE).exists());
    }

    #[test]
    fn test_render_failure_is_not_fatal() {
        assert!(!report_diagram(Err(DiagramError::Render("no fonts".into()))));
        assert!(!report_diagram(Err(DiagramError::Unavailable)));
        assert!(report_diagram(Ok(())));
    }

    #[test]
    fn test_diagram_into_missing_directory_is_not_fatal() {
        let tmp    = tempfile::tempdir().unwrap();
        let params = HyperParams::default().with_data([2000, 1], 4);
        let layers = describe(&params).unwrap();
        let gone   = tmp.path().join("missing");

        assert!(!try_render_diagram(&layers, &gone));
        assert!(!gone.join(DIAGRAM_FILE).exists());
    }

    #[cfg(feature = "plot")]
    #[test]
    fn test_render_error_is_typed() {
        let tmp    = tempfile::tempdir().unwrap();
        let layers = describe(&HyperParams::default().with_data([2000, 1], 4)).unwrap();
        let err = render_diagram(&layers, &tmp.path().join("missing").join(DIAGRAM_FILE))
            .unwrap_err();
        assert!(matches!(err, DiagramError::Render(_)));
    }

    #[test]
    fn test_missing_data_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            data_path: tmp.path().join("nowhere").display().to_string(),
            save_dir:  tmp.path().join("saved").display().to_string(),
            ..TrainConfig::default()
        };
        let device = Default::default();
        assert!(TrainUseCase::new(cfg).execute_on::<TestBackend>(&device).is_err());
    }

    #[test]
    fn test_end_to_end_run_writes_artifacts() {
        let data  = tempfile::tempdir().unwrap();
        let saved = tempfile::tempdir().unwrap();
        write_records(data.path());

        let cfg = TrainConfig {
            data_path: data.path().display().to_string(),
            save_dir:  saved.path().display().to_string(),
            epochs:    1,
            verbose:   0,
            ..TrainConfig::default()
        };
        let device  = Default::default();
        let outcome = TrainUseCase::new(cfg).execute_on::<TestBackend>(&device).unwrap();

        assert_eq!(outcome.history.len(), 1);
        assert!(outcome.run_dir.starts_with(saved.path().join("conv")));

        let params: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(outcome.run_dir.join(PARAMS_FILE)).unwrap())
                .unwrap();
        assert!(params.get("input_shape").is_none());
        assert_eq!(params["version"], 1);

        let metrics = fs::read_to_string(outcome.run_dir.join(METRICS_FILE)).unwrap();
        assert_eq!(metrics.lines().count(), 2);

        let val_loss = outcome.history.epochs[0].val_loss;
        if val_loss.is_finite() {
            let path = ModelCheckpoint::new(&outcome.run_dir)
                .checkpoint_path::<TestBackend>(1, val_loss);
            assert!(path.exists());
        }
        assert!(data.path().join("ecg_cache.bin").exists());
    }
}
