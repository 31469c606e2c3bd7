//! # Core Runtime Module
//!
//! Foundational runtime pieces shared by the drive crates:
//! - Logging and tracing infrastructure
//! - Façade configuration with fail-fast validation
//!
//! ## Overview
//!
//! Nothing in here talks to the network. The crate establishes the logging
//! conventions and the single configuration surface (`DriveConfig`) that the
//! façade is built from.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{DriveConfig, DriveConfigBuilder};
pub use error::{Error, Result};
