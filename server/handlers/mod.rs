pub mod index;
pub mod styles;
pub mod stylize;
