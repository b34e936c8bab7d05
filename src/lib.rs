pub mod config;
pub mod importer;
pub mod logging;
pub mod process;
pub mod schema;
pub mod sink;

pub use config::{Config, ConfigError};
pub use importer::{ImportReport, Importer};
