pub mod defaults;
pub mod derive;
pub mod manifest;
pub mod types;

pub use defaults::{default_specs, DEFAULT_SPECS};
pub use derive::derive_column_type;
pub use manifest::load_manifest;
pub use types::FileSpec;
