//! Inventory operations
//!
//! Each operation resolves the caller through the gateway, authorizes it and
//! only then touches the store.

mod accounts;
mod customers;
mod equipment;

pub use accounts::CurrentUser;

use crate::{ApplicationError, ApplicationResult};

fn require_non_blank(field: &str, value: &str) -> ApplicationResult<()> {
    if value.trim().is_empty() {
        return Err(ApplicationError::validation(field, "must not be blank"));
    }
    Ok(())
}
