// ============================================================
// Layer 4 — ECG Dataset
// ============================================================
// Wraps the loader's arrays in Burn's Dataset trait:
//
//   x : [examples, timesteps, 1]   →  EcgSample.signal
//   y : one-hot or index column    →  EcgSample.label

use anyhow::{bail, Result};
use burn::data::dataset::Dataset;
use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

/// One standardized window and its class index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcgSample {
    pub signal: Vec<f32>,
    pub label:  usize,
}

/// Append the trailing channel axis: [examples, timesteps] → [examples, timesteps, 1].
pub fn with_channel_axis(x: Array2<f32>) -> Array3<f32> {
    x.insert_axis(Axis(2))
}

pub struct EcgDataset {
    samples:   Vec<EcgSample>,
    timesteps: usize,
}

impl EcgDataset {
    /// `x` is [examples, timesteps, 1]; `y` is one-hot [examples, classes]
    /// when `one_hot`, otherwise a single class-index column.
    pub fn from_arrays(x: &Array3<f32>, y: &Array2<f32>, one_hot: bool) -> Result<Self> {
        let (examples, timesteps, channels) = x.dim();
        if channels != 1 {
            bail!("expected a single channel, got {channels}");
        }
        if y.nrows() != examples {
            bail!("{} feature rows but {} label rows", examples, y.nrows());
        }

        let samples = x
            .outer_iter()
            .zip(y.outer_iter())
            .map(|(signal, label)| {
                let label = if one_hot {
                    label
                        .iter()
                        .enumerate()
                        .fold((0usize, f32::NEG_INFINITY), |best, (i, &v)| {
                            if v > best.1 { (i, v) } else { best }
                        })
                        .0
                } else {
                    label.get(0).copied().unwrap_or_default() as usize
                };
                EcgSample { signal: signal.iter().copied().collect(), label }
            })
            .collect();

        Ok(Self { samples, timesteps })
    }

    pub fn timesteps(&self) -> usize { self.timesteps }
}

impl Dataset<EcgSample> for EcgDataset {
    fn get(&self, index: usize) -> Option<EcgSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
