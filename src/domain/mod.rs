// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types shared by every other layer: ECG records,
// the hyperparameter set, and the trait a record source
// implements. No burn types and no file I/O live here.

// A single labelled ECG recording
pub mod record;

// Hyperparameters, before and after the data-dependent fields are added
pub mod params;

// Core abstractions (traits) that other layers implement
pub mod traits;
