//! Domain Layer - Banking types and session outcomes.
//!
//! Pure data types with no I/O. Everything here lives for the duration of a
//! single request.

/// Accounts, balances, statements and date ranges.
pub mod banking;

/// Handshake steps, failure reasons and orchestration results.
pub mod session;
