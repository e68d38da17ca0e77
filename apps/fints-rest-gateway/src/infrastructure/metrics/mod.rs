//! Prometheus Metrics Module
//!
//! Counters and histograms for banking inquiries and rejected requests.
//!
//! # Integration
//!
//! Metrics are served by the Prometheus exporter on its own listener
//! (`GATEWAY_METRICS_PORT`), outside the bearer-token gate. Without an
//! installed recorder every recording function is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::infrastructure::http::InquiryKind;

// =============================================================================
// Installation
// =============================================================================

/// Install the Prometheus recorder and start its HTTP listener.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if a recorder is already installed or the listener
/// cannot be started.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_metrics();
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

fn register_metrics() {
    describe_counter!(
        "fints_gateway_inquiries_total",
        "Banking inquiries by endpoint and outcome"
    );
    describe_counter!(
        "fints_gateway_auth_rejections_total",
        "Requests rejected by the bearer-token gate"
    );
    describe_histogram!(
        "fints_gateway_inquiry_duration_seconds",
        "Wall time of one banking inquiry including the bank handshake"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Why the gate rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No API password configured.
    SecretNotConfigured,
    /// Missing or wrong token.
    InvalidToken,
}

impl AuthRejection {
    const fn as_str(self) -> &'static str {
        match self {
            Self::SecretNotConfigured => "secret_not_configured",
            Self::InvalidToken => "invalid_token",
        }
    }
}

/// Record a finished inquiry.
pub fn record_inquiry(kind: InquiryKind, outcome: &'static str, duration: Duration) {
    counter!(
        "fints_gateway_inquiries_total",
        "inquiry" => kind.as_str(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        "fints_gateway_inquiry_duration_seconds",
        "inquiry" => kind.as_str()
    )
    .record(duration.as_secs_f64());
}

/// Record a request rejected by the gate.
pub fn record_auth_rejection(reason: AuthRejection) {
    counter!(
        "fints_gateway_auth_rejections_total",
        "reason" => reason.as_str()
    )
    .increment(1);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_rejection_as_str() {
        assert_eq!(
            AuthRejection::SecretNotConfigured.as_str(),
            "secret_not_configured"
        );
        assert_eq!(AuthRejection::InvalidToken.as_str(), "invalid_token");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_inquiry(InquiryKind::Balance, "success", Duration::from_millis(5));
        record_auth_rejection(AuthRejection::InvalidToken);
    }
}
