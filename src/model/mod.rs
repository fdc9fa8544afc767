pub mod library;
pub mod loader;

pub use library::{validate_style_name, StyleLibrary};
pub use loader::{is_running_stat, is_zip_checkpoint, load_style_model, read_weights, strip_running_stats};
