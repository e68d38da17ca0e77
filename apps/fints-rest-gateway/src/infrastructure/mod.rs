//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Bank connector adapters.
pub mod bank;

/// Configuration loading and credential provider.
pub mod config;

/// HTTP router, authentication and JSON DTOs.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Tracing subscriber and OpenTelemetry integration.
pub mod telemetry;
