//! HTTP error mapping.
//!
//! The single place where failures become status codes and `{"error": ...}`
//! bodies.
//!
//! | Failure | Status |
//! |---------|--------|
//! | API password unset | 500 |
//! | bad or missing bearer token | 401 |
//! | FinTS configuration incomplete | 500 |
//! | TAN required (any step) | 401 |
//! | no accounts / balance / statements | 404 |
//! | banking client fault | 500 |
//! | unreadable `from`/`to` or query string | 500 |
//! | unknown route | 404 |
//! | known route, wrong method | 405 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::domain::session::FailureReason;

use super::response::ErrorResponse;

/// Which endpoint an inquiry failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InquiryKind {
    /// `GET /api/balance`.
    Balance,
    /// `GET /api/transactions`.
    Transactions,
}

impl InquiryKind {
    /// Label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Transactions => "transactions",
        }
    }

    const fn failure_prefix(self) -> &'static str {
        match self {
            Self::Balance => "Failed to retrieve balance",
            Self::Transactions => "Failed to retrieve transactions",
        }
    }
}

/// Errors rendered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No API password configured.
    #[error("API password not configured")]
    SecretNotConfigured,

    /// Missing or wrong bearer token.
    #[error("Unauthorized - Invalid or missing API key")]
    Unauthorized,

    /// A banking inquiry failed.
    #[error("{}", render_failure(.kind, .reason))]
    Inquiry {
        /// Endpoint.
        kind: InquiryKind,
        /// Why.
        reason: FailureReason,
    },

    /// No such route.
    #[error("Not found")]
    RouteNotFound,

    /// The route exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    /// Wrap an inquiry failure.
    #[must_use]
    pub const fn inquiry(kind: InquiryKind, reason: FailureReason) -> Self {
        Self::Inquiry { kind, reason }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::SecretNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Inquiry { reason, .. } => match reason {
                FailureReason::ConfigIncomplete | FailureReason::ProtocolError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                FailureReason::SecondFactorRequired(_) => StatusCode::UNAUTHORIZED,
                FailureReason::NoAccountsFound
                | FailureReason::NoBalanceAvailable
                | FailureReason::NoStatementsAvailable => StatusCode::NOT_FOUND,
            },
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

fn render_failure(kind: &InquiryKind, reason: &FailureReason) -> String {
    match reason {
        FailureReason::ProtocolError(message) => format!("{}: {message}", kind.failure_prefix()),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::session::SessionStep;

    #[test_case(FailureReason::ConfigIncomplete, StatusCode::INTERNAL_SERVER_ERROR, "FinTS configuration incomplete")]
    #[test_case(FailureReason::SecondFactorRequired(SessionStep::Balance), StatusCode::UNAUTHORIZED, "TAN required for balance inquiry")]
    #[test_case(FailureReason::NoAccountsFound, StatusCode::NOT_FOUND, "No accounts found")]
    #[test_case(FailureReason::NoBalanceAvailable, StatusCode::NOT_FOUND, "No balance information available")]
    #[test_case(FailureReason::NoStatementsAvailable, StatusCode::NOT_FOUND, "No transaction statements available")]
    #[test_case(FailureReason::ProtocolError("timeout".to_string()), StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve balance: timeout")]
    fn balance_failure_mapping(reason: FailureReason, status: StatusCode, message: &str) {
        let err = ApiError::inquiry(InquiryKind::Balance, reason);
        assert_eq!(err.status_code(), status);
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn transactions_protocol_error_prefix() {
        let err = ApiError::inquiry(
            InquiryKind::Transactions,
            FailureReason::ProtocolError("boom".to_string()),
        );
        assert_eq!(err.to_string(), "Failed to retrieve transactions: boom");
    }

    #[test]
    fn gate_errors() {
        assert_eq!(
            ApiError::SecretNotConfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Unauthorized.to_string(),
            "Unauthorized - Invalid or missing API key"
        );
    }

    #[test]
    fn routing_errors() {
        assert_eq!(ApiError::RouteNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ApiError::MethodNotAllowed.to_string(), "Method not allowed");
    }
}
