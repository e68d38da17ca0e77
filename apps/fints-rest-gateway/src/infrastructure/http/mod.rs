//! HTTP Adapter
//!
//! Axum router and server, bearer-token gate, request parsing and JSON
//! response DTOs.

mod auth;
mod controller;
mod error;
mod request;
mod response;
mod server;

pub use auth::{BearerGate, require_bearer};
pub use controller::{AppState, create_router};
pub use error::{ApiError, InquiryKind};
pub use request::{DEFAULT_FROM, DEFAULT_TO, DateParseError, TransactionsQuery, parse_date_phrase};
pub use response::{
    AccountResponse, BalanceEnvelope, BalanceResponse, DateRangeResponse, ErrorResponse,
    StatementResponse, TransactionResponse, TransactionsEnvelope, iso8601,
};
pub use server::{GatewayServer, ServerError};
