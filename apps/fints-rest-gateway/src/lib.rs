#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! FinTS REST Gateway
//!
//! An HTTP service exposing the booked balance and the transaction history
//! of a FinTS/HBCI bank account as JSON. Every request runs a fresh banking
//! dialog; nothing is cached or shared between requests.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Banking data and handshake outcomes
//!   - `banking`: Accounts, balances, statements, date ranges
//!   - `session`: Handshake steps, failure reasons, results
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: The banking connector and session contract
//!   - `use_cases`: The session orchestrator
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `bank`: Connector selection and the fixture-backed sandbox
//!   - `config`: Environment configuration and credential provider
//!   - `http`: Axum router, bearer-token gate, JSON DTOs
//!   - `metrics`: Prometheus exporter
//!   - `telemetry`: Tracing subscriber and OTLP export
//!
//! # Request Flow
//!
//! ```text
//! GET /api/balance ──► bearer gate ──► credentials ──► orchestrator ──► bank
//!                                                          │
//!            JSON envelope / {"error": ...} ◄──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Banking types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::banking::{
    Account, Balance, BankCredentials, CreditDebit, DateRange, Statement, Transaction,
};
pub use domain::session::{
    BalanceSnapshot, FailureReason, OrchestrationResult, SessionStep, StatementHistory,
};

// Application
pub use application::ports::{BankingConnector, BankingError, BankingSession, ProductIdentity};
pub use application::use_cases::SessionOrchestrator;

// Infrastructure config
pub use infrastructure::config::{
    ConfigError, CredentialProvider, FintsSettings, GatewayConfig, GatewaySecret, SandboxSource,
    ServerSettings,
};

// Bank connectors
pub use infrastructure::bank::{ConfiguredBank, SandboxBank, SandboxFixture};

// HTTP
pub use infrastructure::http::{AppState, BearerGate, GatewayServer, create_router};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
