use candle_core::{Module, Result, Tensor};
use candle_nn::{Init, VarBuilder};

const EPS: f64 = 1e-5;

/// Affine instance normalization.
///
/// Each channel of each sample is normalized over its own H×W plane, so the
/// running statistics some checkpoints carry are never consulted.
#[derive(Debug, Clone)]
pub struct InstanceNorm {
    weight: Tensor,
    bias: Tensor,
    channels: usize,
}

impl InstanceNorm {
    pub fn new(channels: usize, vb: VarBuilder) -> Result<InstanceNorm> {
        let weight = vb.get_with_hints(channels, "weight", Init::Const(1.0))?;
        let bias = vb.get_with_hints(channels, "bias", Init::Const(0.0))?;
        Ok(InstanceNorm { weight, bias, channels })
    }
}

impl Module for InstanceNorm {
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let (b, c, h, w) = x.dims4()?;
        let flat = x.reshape((b, c, h * w))?;
        let mean = flat.mean_keepdim(2)?;
        let centered = flat.broadcast_sub(&mean)?;
        let var = centered.sqr()?.mean_keepdim(2)?;
        let normed = centered
            .broadcast_div(&var.affine(1.0, EPS)?.sqrt()?)?
            .reshape((b, c, h, w))?;

        let weight = self.weight.reshape((1, self.channels, 1, 1))?;
        let bias = self.bias.reshape((1, self.channels, 1, 1))?;
        normed.broadcast_mul(&weight)?.broadcast_add(&bias)
    }
}
