pub mod conv;
pub mod norm;
pub mod residual;

pub use conv::{reflection_pad2d, ConvLayer, UpsampleConvLayer};
pub use norm::InstanceNorm;
pub use residual::ResidualBlock;
