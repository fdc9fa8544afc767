use candle_core::{Module, Result, Tensor};
use candle_nn::VarBuilder;

use crate::layers::{ConvLayer, InstanceNorm, ResidualBlock, UpsampleConvLayer};

/// Number of residual blocks between the encoder and decoder.
pub const RESIDUAL_BLOCKS: usize = 5;

/// Feed-forward image transformation network for fast style transfer.
///
/// Encoder: 9×9 conv to 32 channels, then two stride-2 3×3 convs to 64 and
/// 128 channels.  Five residual blocks at 128 channels.  Decoder: two
/// upsample-convs back to 64 and 32 channels and a final 9×9 conv to RGB.
/// Every stage except the last is followed by instance norm and ReLU.
///
/// Parameter names follow the PyTorch module tree (`conv1.conv2d.weight`,
/// `res3.in2.bias`, `deconv2.conv2d.weight`, ...), so checkpoints load as-is.
#[derive(Debug, Clone)]
pub struct TransformerNet {
    conv1: ConvLayer,
    in1: InstanceNorm,
    conv2: ConvLayer,
    in2: InstanceNorm,
    conv3: ConvLayer,
    in3: InstanceNorm,
    residuals: Vec<ResidualBlock>,
    deconv1: UpsampleConvLayer,
    in4: InstanceNorm,
    deconv2: UpsampleConvLayer,
    in5: InstanceNorm,
    deconv3: ConvLayer,
}

impl TransformerNet {
    pub fn new(vb: VarBuilder) -> Result<TransformerNet> {
        let residuals = (1..=RESIDUAL_BLOCKS)
            .map(|i| ResidualBlock::new(128, vb.pp(format!("res{i}"))))
            .collect::<Result<Vec<_>>>()?;

        Ok(TransformerNet {
            conv1: ConvLayer::new(3, 32, 9, 1, vb.pp("conv1"))?,
            in1: InstanceNorm::new(32, vb.pp("in1"))?,
            conv2: ConvLayer::new(32, 64, 3, 2, vb.pp("conv2"))?,
            in2: InstanceNorm::new(64, vb.pp("in2"))?,
            conv3: ConvLayer::new(64, 128, 3, 2, vb.pp("conv3"))?,
            in3: InstanceNorm::new(128, vb.pp("in3"))?,
            residuals,
            deconv1: UpsampleConvLayer::new(128, 64, 3, 1, Some(2), vb.pp("deconv1"))?,
            in4: InstanceNorm::new(64, vb.pp("in4"))?,
            deconv2: UpsampleConvLayer::new(64, 32, 3, 1, Some(2), vb.pp("deconv2"))?,
            in5: InstanceNorm::new(32, vb.pp("in5"))?,
            deconv3: ConvLayer::new(32, 3, 9, 1, vb.pp("deconv3"))?,
        })
    }
}

impl Module for TransformerNet {
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let mut y = self.in1.forward(&self.conv1.forward(x)?)?.relu()?;
        y = self.in2.forward(&self.conv2.forward(&y)?)?.relu()?;
        y = self.in3.forward(&self.conv3.forward(&y)?)?.relu()?;
        for block in &self.residuals {
            y = block.forward(&y)?;
        }
        y = self.in4.forward(&self.deconv1.forward(&y)?)?.relu()?;
        y = self.in5.forward(&self.deconv2.forward(&y)?)?.relu()?;
        self.deconv3.forward(&y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn output_is_rgb_at_input_size_for_multiples_of_four() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let net = TransformerNet::new(vb).unwrap();
        let x = Tensor::zeros((1, 3, 16, 12), DType::F32, &Device::Cpu).unwrap();
        assert_eq!(net.forward(&x).unwrap().dims(), &[1, 3, 16, 12]);
    }

    #[test]
    fn odd_sizes_round_up_through_the_encoder() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let net = TransformerNet::new(vb).unwrap();
        let x = Tensor::zeros((1, 3, 15, 13), DType::F32, &Device::Cpu).unwrap();
        // 15 -> 8 -> 4 -> 8 -> 16, 13 -> 7 -> 4 -> 8 -> 16
        assert_eq!(net.forward(&x).unwrap().dims(), &[1, 3, 16, 16]);
    }
}
