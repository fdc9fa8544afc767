use candle_core::{bail, Module, Result, Tensor};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, VarBuilder};

/// Reflection padding followed by a 2-D convolution.
///
/// Padding is `kernel / 2` on every side, so a stride-1 layer keeps the
/// spatial size.  Weights live under `{prefix}.conv2d.{weight,bias}`.
#[derive(Debug, Clone)]
pub struct ConvLayer {
    conv2d: Conv2d,
    padding: usize,
}

impl ConvLayer {
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        vb: VarBuilder,
    ) -> Result<ConvLayer> {
        let config = Conv2dConfig { stride, ..Conv2dConfig::default() };
        let conv2d = conv2d(in_channels, out_channels, kernel_size, config, vb.pp("conv2d"))?;
        Ok(ConvLayer { conv2d, padding: kernel_size / 2 })
    }
}

impl Module for ConvLayer {
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let padded = reflection_pad2d(x, self.padding)?;
        self.conv2d.forward(&padded)
    }
}

/// Nearest-neighbour upsampling followed by a `ConvLayer`.
///
/// Used instead of transposed convolution; it avoids checkerboard artifacts.
#[derive(Debug, Clone)]
pub struct UpsampleConvLayer {
    conv: ConvLayer,
    upsample: Option<usize>,
}

impl UpsampleConvLayer {
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        upsample: Option<usize>,
        vb: VarBuilder,
    ) -> Result<UpsampleConvLayer> {
        let conv = ConvLayer::new(in_channels, out_channels, kernel_size, stride, vb)?;
        Ok(UpsampleConvLayer { conv, upsample })
    }
}

impl Module for UpsampleConvLayer {
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        match self.upsample {
            Some(factor) if factor > 1 => {
                let (_, _, h, w) = x.dims4()?;
                let up = x.upsample_nearest2d(h * factor, w * factor)?;
                self.conv.forward(&up)
            }
            _ => self.conv.forward(x),
        }
    }
}

/// Pads the last two dimensions of an NCHW tensor by mirroring the border
/// without repeating the edge pixel (`[a b c]` padded by 1 is `[b a b c b]`).
pub fn reflection_pad2d(x: &Tensor, pad: usize) -> Result<Tensor> {
    if pad == 0 {
        return Ok(x.clone());
    }
    let rows = reflect_dim(x, 2, pad)?;
    reflect_dim(&rows, 3, pad)
}

fn reflect_dim(x: &Tensor, dim: usize, pad: usize) -> Result<Tensor> {
    let n = x.dim(dim)?;
    if pad >= n {
        bail!("reflection pad {pad} needs dimension {dim} larger than {n}");
    }

    let mut parts = Vec::with_capacity(2 * pad + 1);
    for i in (1..=pad).rev() {
        parts.push(x.narrow(dim, i, 1)?);
    }
    parts.push(x.clone());
    for i in (n - 1 - pad..n - 1).rev() {
        parts.push(x.narrow(dim, i, 1)?);
    }
    Tensor::cat(&parts, dim)
}
