pub mod settings;

pub use settings::{CozeConfig, ServerConfig, Settings};
