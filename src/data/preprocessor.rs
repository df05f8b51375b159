// ============================================================
// Layer 4 — Signal Standardizer
// ============================================================
// Rescales every sample to zero mean and unit variance. The
// statistics are fitted on the training windows only and then
// applied unchanged to the validation windows, so validation
// data never leaks into the preprocessing.
//
// A flat training set (std == 0) would divide by zero; its std
// is taken as 1 so values are only centred.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: f32,
    pub std:  f32,
}

impl Standardizer {
    /// Fit global mean / std over every value of `x`.
    pub fn fit(x: &Array2<f32>) -> Self {
        if x.is_empty() {
            return Self { mean: 0.0, std: 1.0 };
        }
        let mean = x.mean().unwrap_or(0.0);
        let std  = x.std(0.0);
        let std  = if std.is_finite() && std > f32::EPSILON { std } else { 1.0 };
        Self { mean, std }
    }

    /// Standardize in place.
    pub fn apply(&self, x: &mut Array2<f32>) {
        let (mean, std) = (self.mean, self.std);
        x.mapv_inplace(|v| (v - mean) / std);
    }
}

impl Default for Standardizer {
    fn default() -> Self {
        Self { mean: 0.0, std: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_and_apply() {
        let mut x = array![[1.0f32, 2.0], [3.0, 4.0]];
        let s = Standardizer::fit(&x);
        assert!((s.mean - 2.5).abs() < 1e-6);
        s.apply(&mut x);
        assert!(x.mean().unwrap().abs() < 1e-6);
        assert!((x.std(0.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_constant_input_only_centres() {
        let mut x = array![[5.0f32, 5.0, 5.0]];
        let s = Standardizer::fit(&x);
        assert_eq!(s.std, 1.0);
        s.apply(&mut x);
        assert!(x.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_empty_input() {
        let x = Array2::<f32>::zeros((0, 10));
        assert_eq!(Standardizer::fit(&x), Standardizer::default());
    }
}
