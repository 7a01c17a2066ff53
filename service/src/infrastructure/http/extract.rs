//! Request-scoped extractors: the acting identity forwarded by the
//! gateway and the client details the audit ledger records.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};

use syllabus_common::{RequestContext, Username};

use crate::infrastructure::http::api::ApiError;

/// Header set by the authenticating gateway; requests reaching this
/// service directly without it are refused.
pub const ACTING_USER_HEADER: &str = "x-user";

#[derive(Debug, Clone)]
pub struct ActingUser(pub Username);

impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ACTING_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Missing authenticated user identity".to_string())
            })?;

        Username::try_new(value)
            .map(ActingUser)
            .map_err(|_| ApiError::Unauthorized("Invalid authenticated user identity".to_string()))
    }
}

/// Client address and agent for the audit trail, resolved from headers
/// here so the domain never touches ambient request state.
#[derive(Debug, Clone)]
pub struct RequestMeta(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestMeta(RequestContext {
            ip_address: client_ip(&parts.headers),
            user_agent: parts
                .headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }))
    }
}

/// Forwarded address wins over the direct peer: the service normally
/// sits behind the gateway or a load balancer.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(forwarded.to_string());
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
