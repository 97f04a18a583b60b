//! Role enumeration with an explicit privilege order

use cryptiomt_core::AdminRole;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Effective role of a resolved principal.
///
/// `Customer` is implicit: a caller with no admin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Analyst,
    Customer,
}

impl Role {
    /// Roles from least to most privileged
    pub const PRIVILEGE_ORDER: [Role; 4] =
        [Role::Customer, Role::Analyst, Role::Admin, Role::SuperAdmin];

    /// Position in the privilege order, higher is more privileged
    pub fn rank(&self) -> u8 {
        match self {
            Role::Customer => 0,
            Role::Analyst => 1,
            Role::Admin => 2,
            Role::SuperAdmin => 3,
        }
    }

    /// Check if this role has at least the privileges of `other`
    pub fn includes(&self, other: &Role) -> bool {
        self.rank() >= other.rank()
    }

    pub fn is_staff(&self) -> bool {
        self.includes(&Role::Analyst)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Analyst => "analyst",
            Role::Customer => "customer",
        }
    }
}

impl From<AdminRole> for Role {
    fn from(role: AdminRole) -> Self {
        match role {
            AdminRole::SuperAdmin => Role::SuperAdmin,
            AdminRole::Admin => Role::Admin,
            AdminRole::Analyst => Role::Analyst,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_order_is_ascending() {
        let ranks: Vec<u8> = Role::PRIVILEGE_ORDER.iter().map(Role::rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_includes_is_a_superset_relation() {
        assert!(Role::SuperAdmin.includes(&Role::Admin));
        assert!(Role::Admin.includes(&Role::Analyst));
        assert!(Role::Analyst.includes(&Role::Customer));
        assert!(Role::Admin.includes(&Role::Admin));
        assert!(!Role::Analyst.includes(&Role::Admin));
        assert!(!Role::Customer.includes(&Role::Analyst));
    }

    #[test]
    fn test_stored_roles_map_to_staff() {
        for stored in [AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::Analyst] {
            assert!(Role::from(stored).is_staff());
        }
        assert!(!Role::Customer.is_staff());
    }
}
