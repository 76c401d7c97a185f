//! GridLoad shared library
//!
//! Functions shared by GridLoad tools:
//! - layered dashboard configuration
//! - logging setup with runtime level changes

pub mod config;
pub mod error;
pub mod logging;

pub use config::{DashboardConfig, ENV_PREFIX};
pub use error::{Error, Result};
pub use logging::{init_with_config, LogConfig};
