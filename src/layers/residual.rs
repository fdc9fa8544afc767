use candle_core::{Module, Result, Tensor};
use candle_nn::VarBuilder;

use super::conv::ConvLayer;
use super::norm::InstanceNorm;

/// Two 3×3 conv + instance-norm stages with an identity skip connection.
#[derive(Debug, Clone)]
pub struct ResidualBlock {
    conv1: ConvLayer,
    in1: InstanceNorm,
    conv2: ConvLayer,
    in2: InstanceNorm,
}

impl ResidualBlock {
    pub fn new(channels: usize, vb: VarBuilder) -> Result<ResidualBlock> {
        Ok(ResidualBlock {
            conv1: ConvLayer::new(channels, channels, 3, 1, vb.pp("conv1"))?,
            in1: InstanceNorm::new(channels, vb.pp("in1"))?,
            conv2: ConvLayer::new(channels, channels, 3, 1, vb.pp("conv2"))?,
            in2: InstanceNorm::new(channels, vb.pp("in2"))?,
        })
    }
}

impl Module for ResidualBlock {
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let out = self.in1.forward(&self.conv1.forward(x)?)?.relu()?;
        let out = self.in2.forward(&self.conv2.forward(&out)?)?;
        out + x
    }
}
