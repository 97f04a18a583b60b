//! Common types used across multiple handlers

use cryptiomt_applications::CurrentUser;
use cryptiomt_core::CustomerId;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Whether the document store answered
    pub store_available: bool,
}

/// Sign-in state of the caller
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub user: Option<CurrentUser>,
}

/// Optional customer filter for equipment statistics
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Restrict the aggregate to this customer
    pub customer_id: Option<String>,
}

impl StatsQuery {
    /// The requested customer; a blank value means every customer
    pub fn customer(&self) -> Option<CustomerId> {
        self.customer_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(CustomerId::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_customer_filter_is_absent() {
        let query = |value: Option<&str>| StatsQuery {
            customer_id: value.map(str::to_string),
        };

        assert_eq!(query(None).customer(), None);
        assert_eq!(query(Some("")).customer(), None);
        assert_eq!(query(Some("  ")).customer(), None);
        assert_eq!(query(Some("c1")).customer(), Some(CustomerId::from("c1")));
    }
}
