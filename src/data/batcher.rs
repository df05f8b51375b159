// ============================================================
// Layer 4 — ECG Batcher
// ============================================================
// Implements Burn's Batcher trait: a Vec of EcgSamples becomes
//
//   signals : [batch, timesteps, 1]   float
//   targets : [batch]                 int (class index)
//
// All windows have the same length, so batching is a flat copy
// followed by a reshape.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::EcgSample;

#[derive(Debug, Clone)]
pub struct EcgBatch<B: Backend> {
    pub signals: Tensor<B, 3>,
    pub targets: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct EcgBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> EcgBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<EcgSample, EcgBatch<B>> for EcgBatcher<B> {
    fn batch(&self, items: Vec<EcgSample>) -> EcgBatch<B> {
        let batch_size = items.len();
        let timesteps  = items.first().map(|s| s.signal.len()).unwrap_or(0);

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.signal.iter().copied())
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let signals = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, timesteps, 1]);

        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        EcgBatch { signals, targets }
    }
}
