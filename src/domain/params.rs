// ============================================================
// Layer 3 — Hyperparameters
// ============================================================
// HyperParams is the flat set chosen before any data is seen;
// it is what params.json contains. NetworkParams adds the two
// data-dependent fields (input shape and category count) that
// the network builder needs. params.json is written from
// HyperParams, so it never carries those two fields.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Stride of each convolution block, one entry per block
    pub subsample_lengths: Vec<usize>,
    /// Kernel width of every convolution
    pub filter_length:     usize,
    /// Output channels of every convolution
    pub num_filters:       usize,
    /// Dropout probability used after conv and dense blocks
    pub dropout:           f64,
    pub recurrent_layers:  usize,
    pub recurrent_hidden:  usize,
    pub dense_layers:      usize,
    pub dense_hidden:      usize,
    /// Manually bumped when the meaning of a field changes
    pub version:           u32,
}

impl Default for HyperParams {
    fn default() -> Self {
        Self {
            subsample_lengths: vec![2, 2, 2, 5, 5],
            filter_length:     32,
            num_filters:       32,
            dropout:           0.3,
            recurrent_layers:  1,
            recurrent_hidden:  64,
            dense_layers:      1,
            dense_hidden:      64,
            version:           1,
        }
    }
}

impl HyperParams {
    /// Attach the data-dependent fields once the dataset is loaded.
    pub fn with_data(self, input_shape: [usize; 2], num_categories: usize) -> NetworkParams {
        NetworkParams {
            hyper: self,
            input_shape,
            num_categories,
        }
    }
}

/// Everything the network builder needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkParams {
    #[serde(flatten)]
    pub hyper: HyperParams,

    /// (timesteps, channels) of a single example
    pub input_shape: [usize; 2],

    pub num_categories: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let p = HyperParams::default();
        assert_eq!(p.subsample_lengths, vec![2, 2, 2, 5, 5]);
        assert_eq!(p.filter_length, 32);
        assert_eq!(p.num_filters, 32);
        assert_eq!(p.dropout, 0.3);
        assert_eq!(p.version, 1);
    }

    #[test]
    fn test_network_params_serialize_flat() {
        let net = HyperParams::default().with_data([2000, 1], 4);
        let value = serde_json::to_value(&net).unwrap();
        let obj = value.as_object().unwrap();
        // The hyperparameters sit at the top level next to the data fields
        assert!(obj.contains_key("filter_length"));
        assert!(obj.contains_key("input_shape"));
        assert_eq!(obj["num_categories"], 4);
        assert!(!obj.contains_key("hyper"));
    }
}
