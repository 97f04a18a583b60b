//! Caller identity from identity-provider headers
//!
//! The service never issues or validates tokens. The fronting identity
//! provider forwards the authenticated subject in `x-user-id`, with optional
//! `x-user-name` and `x-user-email`.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use cryptiomt_applications::CallerIdentity;
use tracing::debug;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Optional caller identity; never rejects, anonymous requests carry `None`
#[derive(Debug, Clone)]
pub struct Caller(pub Option<CallerIdentity>);

impl Caller {
    pub fn identity(&self) -> Option<&CallerIdentity> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(identity_from_headers(&parts.headers)))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

/// Extract the caller identity; a missing or blank subject means anonymous
pub fn identity_from_headers(headers: &HeaderMap) -> Option<CallerIdentity> {
    let subject = header_value(headers, USER_ID_HEADER)?;
    debug!("Request from subject {}", subject);

    Some(CallerIdentity {
        subject,
        name: header_value(headers, USER_NAME_HEADER),
        email: header_value(headers, USER_EMAIL_HEADER),
    })
}
