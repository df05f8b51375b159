// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// The `train` arguments: one positional data path, the cache
// refresh flag, and a handful of optional overrides whose
// defaults reproduce a standard 200-epoch run.

use clap::Args;
use crate::application::train_use_case::TrainConfig;

/// All arguments accepted by the trainer.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Path to the ECG data directory (REFERENCE.csv + *.ecg)
    pub data_path: String,

    /// Ignore the cached dataset and rebuild it from the raw records
    #[arg(long)]
    pub refresh: bool,

    /// Root directory for run artifacts
    #[arg(long, default_value = "./saved")]
    pub save_dir: String,

    /// Number of full passes over the training set
    #[arg(long, default_value_t = 200)]
    pub epochs: usize,

    /// Examples per optimisation step
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// 0 = silent, 1 = progress bar + epoch line, 2 = epoch line only
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub verbose: u8,
}

/// Boundary between Layer 1 and Layer 2: the application
/// layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:     a.data_path,
            refresh:       a.refresh,
            save_dir:      a.save_dir,
            epochs:        a.epochs,
            batch_size:    a.batch_size,
            learning_rate: a.lr,
            verbose:       a.verbose,
            ..TrainConfig::default()
        }
    }
}
