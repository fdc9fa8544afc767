pub mod device;
pub mod transformer;

pub use device::get_device;
pub use transformer::TransformerNet;
