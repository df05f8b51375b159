// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw .ecg files to tensor batches:
//
//   REFERENCE.csv + *.ecg
//       │
//       ▼
//   ReferenceDirectory → labelled records
//       │
//       ▼
//   Loader             → split, windows, standardize, one-hot, cache
//       │
//       ▼
//   EcgDataset         → implements Burn's Dataset trait
//       │
//       ▼
//   EcgBatcher         → stacks samples into tensor batches

/// Reads REFERENCE.csv and the raw .ecg records
pub mod reference;

/// Train/validation arrays, with an on-disk cache
pub mod loader;

/// bincode cache of a built split
pub mod cache;

/// Fixed-length windowing of long recordings
pub mod chunker;

/// Mean/std standardization fitted on the training split
pub mod preprocessor;

/// Seeded shuffle-and-split
pub mod splitter;

/// Burn Dataset over standardized windows
pub mod dataset;

/// Burn Batcher producing [batch, timesteps, 1] tensors
pub mod batcher;
