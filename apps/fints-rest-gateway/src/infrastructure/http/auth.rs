//! Bearer-token gate.
//!
//! Applied to every route, including unknown paths. The `Authorization`
//! header must equal `Bearer <API_PASSWORD>` exactly; the token is compared
//! in constant time.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::infrastructure::config::GatewaySecret;
use crate::infrastructure::metrics::{AuthRejection, record_auth_rejection};

use super::error::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Shared-secret gate in front of the API.
#[derive(Debug, Clone)]
pub struct BearerGate {
    secret: Option<GatewaySecret>,
}

impl BearerGate {
    /// Create a gate. `None` makes every request fail with 500.
    #[must_use]
    pub const fn new(secret: Option<GatewaySecret>) -> Self {
        Self { secret }
    }

    /// Check request headers against the configured secret.
    ///
    /// # Errors
    ///
    /// `ApiError::SecretNotConfigured` without a secret, otherwise
    /// `ApiError::Unauthorized` for a missing or wrong token.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let Some(secret) = &self.secret else {
            return Err(ApiError::SecretNotConfigured);
        };

        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX));

        match token {
            Some(token) if bool::from(token.as_bytes().ct_eq(secret.as_bytes())) => Ok(()),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

/// Axum middleware enforcing the gate.
pub async fn require_bearer(
    State(gate): State<Arc<BearerGate>>,
    request: Request,
    next: Next,
) -> Response {
    match gate.check(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            let reason = if err == ApiError::SecretNotConfigured {
                tracing::error!("Rejecting request: API_PASSWORD is not configured");
                AuthRejection::SecretNotConfigured
            } else {
                tracing::warn!(
                    method = %request.method(),
                    path = request.uri().path(),
                    "Rejecting request with invalid or missing API key"
                );
                AuthRejection::InvalidToken
            };
            record_auth_rejection(reason);
            err.into_response()
        }
    }
}
