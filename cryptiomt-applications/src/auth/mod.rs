//! Authentication and Authorization Module
//!
//! Every data operation goes through the access gateway:
//! - `identity`: the caller identity supplied by the identity provider and the
//!   principal it resolves to
//! - `roles`: the closed role enumeration and its privilege order
//! - `gateway`: principal resolution, authorization rules and scope filters

pub mod gateway;
pub mod identity;
pub mod roles;

pub use gateway::{authorize, AccessGateway, Decision, Denial, Operation, OperationKind, Scope};
pub use identity::{CallerIdentity, Principal};
pub use roles::Role;
