//! Configuration loading and path helpers shared by the trialview crates.

pub mod config;
pub mod path_processing;

pub use config::{CONFIG_PATH_ENV, ConfigError, ViewerConfig, default_config_path};
pub use path_processing::expand_tilde;
