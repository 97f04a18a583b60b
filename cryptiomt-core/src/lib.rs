//! CryptIoMT Core - Core records, configuration and logging
//!
//! This module defines the domain records shared by the access gateway,
//! the document store backends and the web surface.

pub mod config;
pub mod error;
pub mod logging;
pub mod risk;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use risk::*;
pub use types::*;

// Re-export commonly used external types
pub use chrono;
pub use tracing;
