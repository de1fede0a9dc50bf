pub mod config;
pub mod vocabulary;

pub use config::{Config, ConfigError};
