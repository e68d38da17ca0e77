//! Application Ports
//!
//! ## Driven Ports (Outbound)
//!
//! - `BankingConnector` / `BankingSession`: the FinTS/HBCI client

mod banking_session_port;

#[cfg(test)]
pub use banking_session_port::MockBankingSession;
pub use banking_session_port::{
    ActionOutcome, BalanceRequest, BankingConnector, BankingError, BankingSession,
    ProductIdentity, StatementRequest, TanMode,
};
