pub mod config;
pub mod error;
pub mod paths;

pub use config::{Config, LibraryConfig, MetricsConfig};
pub use error::ConfigError;
pub use paths::{PathManager, base_path_override};
