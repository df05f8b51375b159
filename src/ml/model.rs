// ============================================================
// Layer 5 — ECG Network
// ============================================================
// Input  : [batch, timesteps, 1]
//
//   ConvBlock × len(subsample_lengths)
//       Conv1d(num_filters, filter_length, stride = subsample)
//       BatchNorm → ReLU → Dropout
//   LSTM × recurrent_layers        (final hidden state)
//   (Linear → ReLU → Dropout) × dense_layers
//   Linear(num_categories)
//
// Output : logits [batch, num_categories]

use anyhow::{bail, Result};
use burn::{
    nn::{
        conv::{Conv1d, Conv1dConfig},
        loss::CrossEntropyLossConfig,
        BatchNorm, BatchNormConfig,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
        PaddingConfig1d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::params::NetworkParams;

/// One row of the network summary: layer name and per-example output shape.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub name:         String,
    pub output_shape: Vec<usize>,
}

impl std::fmt::Display for LayerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dims: Vec<String> = self.output_shape.iter().map(|d| d.to_string()).collect();
        write!(f, "{:<14} (None, {})", self.name, dims.join(", "))
    }
}

/// Output length of a conv with padding `kernel / 2`.
pub fn conv_output_len(len: usize, kernel: usize, stride: usize) -> usize {
    let padded = len + 2 * (kernel / 2);
    if padded < kernel || stride == 0 {
        return 0;
    }
    (padded - kernel) / stride + 1
}

/// Validate `params` and list every layer with its output shape.
pub fn describe(params: &NetworkParams) -> Result<Vec<LayerSummary>> {
    let hp = &params.hyper;
    let [timesteps, channels] = params.input_shape;

    if hp.subsample_lengths.is_empty() {
        bail!("subsample_lengths must not be empty");
    }
    if let Some(i) = hp.subsample_lengths.iter().position(|&s| s == 0) {
        bail!("subsample_lengths[{i}] is zero");
    }
    if hp.num_filters == 0 || hp.filter_length == 0 {
        bail!("num_filters and filter_length must be positive");
    }
    if !(0.0..1.0).contains(&hp.dropout) {
        bail!("dropout {} is outside [0, 1)", hp.dropout);
    }
    if params.num_categories == 0 {
        bail!("num_categories must be positive");
    }
    if channels == 0 {
        bail!("input must have at least one channel");
    }
    if hp.recurrent_layers > 0 && hp.recurrent_hidden == 0 {
        bail!("recurrent_hidden must be positive");
    }
    if hp.dense_layers > 0 && hp.dense_hidden == 0 {
        bail!("dense_hidden must be positive");
    }

    let mut layers = vec![LayerSummary {
        name:         "input".into(),
        output_shape: vec![timesteps, channels],
    }];

    if timesteps == 0 {
        bail!("input must have at least one timestep");
    }

    // Every conv block must see at least one full kernel of real samples.
    let mut len = timesteps;
    for (i, &stride) in hp.subsample_lengths.iter().enumerate() {
        if len < hp.filter_length {
            bail!(
                "input of {timesteps} timesteps is too short: conv block {i} gets {len} \
                 steps, fewer than filter_length {} (strides {:?})",
                hp.filter_length,
                hp.subsample_lengths
            );
        }
        len = conv_output_len(len, hp.filter_length, stride);
        layers.push(LayerSummary {
            name:         format!("conv_block_{i}"),
            output_shape: vec![len, hp.num_filters],
        });
    }

    let mut width = hp.num_filters;
    for i in 0..hp.recurrent_layers {
        width = hp.recurrent_hidden;
        let shape = if i + 1 == hp.recurrent_layers { vec![width] } else { vec![len, width] };
        layers.push(LayerSummary { name: format!("lstm_{i}"), output_shape: shape });
    }
    if hp.recurrent_layers == 0 {
        layers.push(LayerSummary { name: "mean_pool".into(), output_shape: vec![width] });
    }

    for i in 0..hp.dense_layers {
        layers.push(LayerSummary {
            name:         format!("dense_{i}"),
            output_shape: vec![hp.dense_hidden],
        });
    }

    layers.push(LayerSummary {
        name:         "logits".into(),
        output_shape: vec![params.num_categories],
    });

    Ok(layers)
}

/// Validate `params` and allocate the network on `device`.
pub fn build_network<B: Backend>(params: &NetworkParams, device: &B::Device) -> Result<EcgNetwork<B>> {
    describe(params)?;
    let hp = &params.hyper;

    let mut in_channels = params.input_shape[1];
    let conv_blocks = hp
        .subsample_lengths
        .iter()
        .map(|&stride| {
            let conv = Conv1dConfig::new(in_channels, hp.num_filters, hp.filter_length)
                .with_stride(stride)
                .with_padding(PaddingConfig1d::Explicit(hp.filter_length / 2))
                .init(device);
            in_channels = hp.num_filters;
            ConvBlock {
                conv,
                norm:    BatchNormConfig::new(hp.num_filters).init(device),
                dropout: DropoutConfig::new(hp.dropout).init(),
            }
        })
        .collect();

    let mut width = hp.num_filters;
    let recurrent = (0..hp.recurrent_layers)
        .map(|_| {
            let lstm = LstmConfig::new(width, hp.recurrent_hidden, true).init(device);
            width = hp.recurrent_hidden;
            lstm
        })
        .collect();

    let dense = (0..hp.dense_layers)
        .map(|_| {
            let linear = LinearConfig::new(width, hp.dense_hidden).init(device);
            width = hp.dense_hidden;
            linear
        })
        .collect();

    Ok(EcgNetwork {
        conv_blocks,
        recurrent,
        dense,
        output:  LinearConfig::new(width, params.num_categories).init(device),
        dropout: DropoutConfig::new(hp.dropout).init(),
    })
}

#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv:    Conv1d<B>,
    pub norm:    BatchNorm<B, 1>,
    pub dropout: Dropout,
}

impl<B: Backend> ConvBlock<B> {
    /// [batch, channels, len] → [batch, num_filters, len / stride]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let x = self.conv.forward(x);
        let x = self.norm.forward(x);
        self.dropout.forward(relu(x))
    }
}

#[derive(Module, Debug)]
pub struct EcgNetwork<B: Backend> {
    pub conv_blocks: Vec<ConvBlock<B>>,
    pub recurrent:   Vec<Lstm<B>>,
    pub dense:       Vec<Linear<B>>,
    pub output:      Linear<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EcgNetwork<B> {
    /// signals: [batch, timesteps, channels] → logits: [batch, num_categories]
    pub fn forward(&self, signals: Tensor<B, 3>) -> Tensor<B, 2> {
        // Conv1d wants channels before time.
        let mut x = signals.swap_dims(1, 2);
        for block in &self.conv_blocks {
            x = block.forward(x);
        }
        let mut seq = x.swap_dims(1, 2); // [batch, len, filters]

        let mut hidden = None;
        for lstm in &self.recurrent {
            let (outputs, state) = lstm.forward(seq.clone(), None);
            hidden = Some(state.hidden);
            seq = outputs;
        }
        let summary = match hidden {
            Some(h) => h,
            None => {
                let [batch, _, filters] = seq.dims();
                seq.mean_dim(1).reshape([batch, filters])
            }
        };

        let mut x = summary;
        for linear in &self.dense {
            x = self.dropout.forward(relu(linear.forward(x)));
        }
        self.output.forward(x)
    }

    /// Softmax cross-entropy against class indices; returns (loss, logits).
    pub fn forward_loss(
        &self,
        signals: Tensor<B, 3>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(signals);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }
}
