//! HTTP request handlers for the inventory server
//!
//! This module contains all the HTTP request handlers organized by functionality.

pub mod accounts;
pub mod customers;
pub mod equipment;
pub mod health;
pub mod types;

pub use accounts::*;
pub use customers::*;
pub use equipment::*;
pub use health::*;

pub use types::*;
