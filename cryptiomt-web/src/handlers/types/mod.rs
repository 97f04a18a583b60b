//! Type definitions for handlers
//!
//! This module contains the request/response types used by the handlers.

pub mod common;

pub use common::*;
