pub mod error;
pub mod codec;
pub mod layers;
pub mod network;
pub mod model;
pub mod pipeline;

// Convenience re-exports
pub use error::{Error, Result};
pub use network::TransformerNet;
pub use model::StyleLibrary;
pub use pipeline::{StylizeConfig, Stylizer};
