//! Configuration loading and validation
//!
//! Shiori is configured from a single TOML file supplied at construction
//! time; nothing is reconfigurable afterwards. The file names the Redis
//! server, the logical database, the key namespace, and the visit-tracking
//! parameters (window and ceiling).

pub mod parser;
pub mod types;
pub mod validation;

pub use parser::load_config;
pub use types::{Config, StoreConfig, TrackerConfig};
pub use validation::{parse_address, validate};
