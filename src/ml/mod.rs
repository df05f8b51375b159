// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model and optimisation code lives here:
//
//   model.rs     — Conv → LSTM → dense classifier, its
//                  parameter validation and layer summary
//
//   trainer.rs   — The training loop: forward pass, loss,
//                  backward pass, Adam step, validation,
//                  and per-epoch callbacks
//
//   callbacks.rs — The Callback trait, EpochLog, History
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Convolutional/recurrent ECG classifier
pub mod model;

/// Full training loop with validation and callbacks
pub mod trainer;

/// Training hooks and per-epoch history
pub mod callbacks;
