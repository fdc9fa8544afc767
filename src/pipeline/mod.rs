pub mod stylize_config;
pub mod stylizer;

pub use stylize_config::StylizeConfig;
pub use stylizer::Stylizer;
