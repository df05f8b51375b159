// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything a run writes to disk:
//
//   checkpoint.rs — run folder naming, params.json, and the
//                   best-by-val_loss model checkpoint
//
//   metrics.rs    — per-epoch metrics.csv
//
//   diagram.rs    — model.png, best-effort; failures are a
//                   typed DiagramError the caller ignores

/// Run directory, hyperparameter file, and model checkpoints
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Network topology diagram
pub mod diagram;
