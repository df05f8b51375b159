// ============================================================
// Layer 4 — ECG Loader
// ============================================================
// Produces the train/validation arrays the trainer consumes:
//
//   x_train, x_test : [examples, timesteps]      (standardized)
//   y_train, y_test : [examples, output_dim]     (one-hot)
//                  or [examples, 1]              (class index)
//   output_dim      : number of rhythm classes
//
// Pipeline (only when no usable cache exists):
//
//   REFERENCE.csv + *.ecg
//       │
//       ▼
//   RecordSource      → labelled records
//       │
//       ▼
//   split_train_val   → whole records to train / validation
//       │
//       ▼
//   Chunker           → fixed-length windows per record
//       │
//       ▼
//   Standardizer      → fitted on train, applied to both
//       │
//       ▼
//   DatasetCache      → ecg_cache.bin for the next run

use anyhow::{bail, Context, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::data::{
    cache::{CacheKey, DatasetCache},
    chunker::Chunker,
    preprocessor::Standardizer,
    reference::ReferenceDirectory,
    splitter::split_train_val,
};
use crate::domain::{record::EcgRecord, traits::RecordSource};

/// Settings that change the content of the split (and so the cache key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Samples per example
    pub window_len:   usize,
    /// Samples shared by consecutive windows of one record
    pub overlap:      usize,
    /// Fraction of records held out for validation
    pub val_fraction: f64,
    /// Seed for the record shuffle
    pub seed:         u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            window_len:   2000,
            overlap:      0,
            val_fraction: 0.1,
            seed:         20,
        }
    }
}

impl LoaderConfig {
    fn validate(&self) -> Result<()> {
        if self.window_len == 0 {
            bail!("window_len must be positive");
        }
        if self.overlap >= self.window_len {
            bail!("overlap ({}) must be less than window_len ({})", self.overlap, self.window_len);
        }
        if !(self.val_fraction > 0.0 && self.val_fraction < 1.0) {
            bail!("val_fraction must be in (0, 1), got {}", self.val_fraction);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loader {
    pub x_train:    Array2<f32>,
    pub y_train:    Array2<f32>,
    pub x_test:     Array2<f32>,
    pub y_test:     Array2<f32>,
    pub output_dim: usize,
    /// Class names, index-aligned with the label columns
    pub classes:    Vec<String>,
    pub one_hot:    bool,
    pub standardizer: Standardizer,
}

impl Loader {
    /// Load `data_path` with the default settings.
    pub fn new(
        data_path: impl AsRef<Path>,
        use_one_hot_labels: bool,
        use_cached_if_available: bool,
    ) -> Result<Self> {
        Self::with_config(
            data_path,
            use_one_hot_labels,
            use_cached_if_available,
            &LoaderConfig::default(),
        )
    }

    pub fn with_config(
        data_path: impl AsRef<Path>,
        use_one_hot_labels: bool,
        use_cached_if_available: bool,
        config: &LoaderConfig,
    ) -> Result<Self> {
        config.validate()?;

        let data_path = data_path.as_ref();
        let cache     = DatasetCache::new(data_path);
        let key       = CacheKey::new(config, use_one_hot_labels);

        if use_cached_if_available {
            if let Some(loader) = cache.load(&key)? {
                tracing::info!("Using cached dataset '{}'", cache.path().display());
                return Ok(loader);
            }
        } else {
            tracing::info!("Cache refresh requested, rebuilding from raw records");
        }

        let source = ReferenceDirectory::new(data_path);
        let loader = Self::from_source(&source, use_one_hot_labels, config)?;
        cache.store(&key, &loader)?;
        Ok(loader)
    }

    /// Build the split from any record source, without touching the cache.
    pub fn from_source(
        source: &impl RecordSource,
        use_one_hot_labels: bool,
        config: &LoaderConfig,
    ) -> Result<Self> {
        config.validate()?;
        tracing::info!("Loading records from '{}'", source.describe());

        let chunker = Chunker::new(config.window_len, config.overlap);
        let (usable, short): (Vec<EcgRecord>, Vec<EcgRecord>) = source
            .load_all()?
            .into_iter()
            .partition(|r| chunker.num_chunks(r.samples.len()) > 0);

        for r in &short {
            tracing::warn!(
                "Skipping '{}': {} samples is shorter than one window of {}",
                r.name,
                r.samples.len(),
                config.window_len
            );
        }
        if usable.len() < 2 {
            bail!(
                "Need at least two records of {} or more samples, found {}",
                config.window_len,
                usable.len()
            );
        }

        // Sorted set → stable class indices across runs
        let classes: Vec<String> = usable
            .iter()
            .map(|r| r.label.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let (train_records, val_records) = split_train_val(usable, config.val_fraction, config.seed);

        let (mut x_train, train_idx) = windows(&train_records, &chunker, &classes)?;
        let (mut x_test, test_idx)   = windows(&val_records, &chunker, &classes)?;

        let standardizer = Standardizer::fit(&x_train);
        standardizer.apply(&mut x_train);
        standardizer.apply(&mut x_test);

        let output_dim = classes.len();
        let y_train = encode_labels(&train_idx, output_dim, use_one_hot_labels);
        let y_test  = encode_labels(&test_idx, output_dim, use_one_hot_labels);

        tracing::info!(
            "Built {} train / {} validation windows from {} / {} records, {} classes {:?}",
            x_train.nrows(),
            x_test.nrows(),
            train_records.len(),
            val_records.len(),
            output_dim,
            classes
        );

        Ok(Self {
            x_train,
            y_train,
            x_test,
            y_test,
            output_dim,
            classes,
            one_hot: use_one_hot_labels,
            standardizer,
        })
    }
}

/// Stack every window of `records` into one array, with class indices.
fn windows(
    records: &[EcgRecord],
    chunker: &Chunker,
    classes: &[String],
) -> Result<(Array2<f32>, Vec<usize>)> {
    let window_len = chunker.window_len();
    let mut flat   = Vec::new();
    let mut labels = Vec::new();

    for record in records {
        let Ok(class) = classes.binary_search(&record.label) else {
            bail!("record '{}' has label '{}' outside the class list", record.name, record.label);
        };
        for window in chunker.chunk(&record.samples) {
            flat.extend_from_slice(window);
            labels.push(class);
        }
    }

    let rows = labels.len();
    let x = Array2::from_shape_vec((rows, window_len), flat)
        .context("window buffer does not match [windows, window_len]")?;
    Ok((x, labels))
}

fn encode_labels(indices: &[usize], num_classes: usize, one_hot: bool) -> Array2<f32> {
    if one_hot {
        let mut y = Array2::zeros((indices.len(), num_classes));
        for (row, &class) in indices.iter().enumerate() {
            y[[row, class]] = 1.0;
        }
        y
    } else {
        Array2::from_shape_fn((indices.len(), 1), |(row, _)| indices[row] as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference::{write_samples, REFERENCE_FILE};
    use std::fs;

    fn small_config() -> LoaderConfig {
        LoaderConfig { window_len: 10, overlap: 0, val_fraction: 0.25, seed: 20 }
    }

    fn records() -> Vec<EcgRecord> {
        vec![
            EcgRecord::new("A1", "N",  (0..25).map(|v| v as f32).collect()),
            EcgRecord::new("A2", "AF", (0..20).map(|v| v as f32).collect()),
            EcgRecord::new("A3", "N",  (0..30).map(|v| v as f32).collect()),
            EcgRecord::new("A4", "O",  (0..10).map(|v| v as f32).collect()),
            EcgRecord::new("A5", "N",  vec![1.0; 5]),
        ]
    }

    #[test]
    fn test_shapes_and_one_hot() {
        let l = Loader::from_source(&records(), true, &small_config()).unwrap();
        assert_eq!(l.output_dim, 3);
        assert_eq!(l.classes, vec!["AF", "N", "O"]);
        // A5 is too short; the rest yield 2 + 2 + 3 + 1 windows
        assert_eq!(l.x_train.nrows() + l.x_test.nrows(), 8);
        assert_eq!(l.x_train.ncols(), 10);
        assert_eq!(l.y_train.ncols(), 3);
        assert_eq!(l.y_train.nrows(), l.x_train.nrows());
        for row in l.y_train.rows() {
            assert_eq!(row.sum(), 1.0);
        }
    }

    #[test]
    fn test_index_labels() {
        let l = Loader::from_source(&records(), false, &small_config()).unwrap();
        assert_eq!(l.y_test.ncols(), 1);
        assert!(l.y_test.iter().all(|&c| c >= 0.0 && c < 3.0));
    }

    #[test]
    fn test_training_split_is_standardized() {
        let l = Loader::from_source(&records(), true, &small_config()).unwrap();
        assert!(l.x_train.mean().unwrap().abs() < 1e-4);
    }

    #[test]
    fn test_too_few_records() {
        let recs = vec![EcgRecord::new("A1", "N", vec![0.0; 20])];
        assert!(Loader::from_source(&recs, true, &small_config()).is_err());
    }

    #[test]
    fn test_windows_reject_unknown_label() {
        let chunker = Chunker::new(10, 0);
        let classes = vec!["AF".to_string(), "N".to_string()];

        let known = vec![EcgRecord::new("A1", "N", vec![0.5; 25])];
        let (x, labels) = windows(&known, &chunker, &classes).unwrap();
        assert_eq!(x.dim(), (2, 10));
        assert_eq!(labels, vec![1, 1]);

        let unknown = vec![EcgRecord::new("A2", "O", vec![0.5; 25])];
        let err = windows(&unknown, &chunker, &classes).unwrap_err().to_string();
        assert!(err.contains("A2"), "{err}");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = LoaderConfig { val_fraction: 1.0, ..small_config() };
        assert!(Loader::from_source(&records(), true, &cfg).is_err());
    }

    fn write_dataset(dir: &Path) {
        let mut reference = String::new();
        for (i, label) in ["N", "AF", "N", "O"].iter().enumerate() {
            let name = format!("A{i}");
            reference.push_str(&format!("{name},{label}\n"));
            let samples: Vec<i16> = (0..30i16).map(|v| v * (i as i16 + 1)).collect();
            write_samples(&dir.join(format!("{name}.ecg")), &samples).unwrap();
        }
        fs::write(dir.join(REFERENCE_FILE), reference).unwrap();
    }

    #[test]
    fn test_cache_is_written_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());

        let first = Loader::with_config(dir.path(), true, true, &small_config()).unwrap();
        assert!(dir.path().join(crate::data::cache::CACHE_FILE).exists());

        // With the raw reference gone only the cache can satisfy the load
        fs::remove_file(dir.path().join(REFERENCE_FILE)).unwrap();
        let second = Loader::with_config(dir.path(), true, true, &small_config()).unwrap();
        assert_eq!(first.x_train, second.x_train);
        assert_eq!(first.y_test, second.y_test);

        // Refresh bypasses the cache and so needs the raw files again
        assert!(Loader::with_config(dir.path(), true, false, &small_config()).is_err());
    }

    #[test]
    fn test_cache_with_other_settings_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());

        Loader::with_config(dir.path(), true, true, &small_config()).unwrap();
        let other = LoaderConfig { window_len: 15, ..small_config() };
        let l = Loader::with_config(dir.path(), true, true, &other).unwrap();
        assert_eq!(l.x_train.ncols(), 15);
    }
}
