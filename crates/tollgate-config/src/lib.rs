//! KDL configuration parsing for Tollgate.
//!
//! Parses the trigger configuration file: global trigger settings and the
//! presubmit jobs configured for each repository.

pub mod error;
pub mod presubmit;

pub use error::{ConfigError, ConfigResult};
pub use presubmit::{RepoConfig, TriggerConfig, load_trigger_config, parse_trigger_config};
