pub mod config;
pub mod format;
pub mod safety;

pub use config::Config;
pub use format::{format_path, format_size};
