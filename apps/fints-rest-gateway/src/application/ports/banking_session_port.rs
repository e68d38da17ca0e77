//! Banking Session Port (Driven Port)
//!
//! Contract of the FinTS/HBCI client the gateway drives. The wire protocol
//! itself lives behind this trait; the gateway only sequences the calls.
//!
//! A `BankingConnector` opens one dialog per request. The returned
//! `BankingSession` is then driven strictly in order:
//! TAN mode selection, login, account discovery, one action, dialog end.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::banking::{Account, BankCredentials, Balance, DateRange, Statement};

/// Product registration the gateway presents to the bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductIdentity {
    /// Registered product name.
    pub name: String,
    /// Product version.
    pub version: String,
}

impl ProductIdentity {
    /// Name this gateway registers with.
    pub const GATEWAY_NAME: &'static str = "HBCI-REST-Client";
    /// Version this gateway registers with.
    pub const GATEWAY_VERSION: &'static str = "1.0.0";

    /// Create a product identity.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Default for ProductIdentity {
    fn default() -> Self {
        Self::new(Self::GATEWAY_NAME, Self::GATEWAY_VERSION)
    }
}

/// Second-factor mode selected before login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TanMode {
    /// Pre-PSD2 single-step mode without any out-of-band challenge. Used for
    /// institutions that do not support anonymous dialogs.
    #[default]
    NoPsd2,
}

impl TanMode {
    /// Mode name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoPsd2 => "no_psd2",
        }
    }
}

/// Outcome of one action inside the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<T> {
    /// The action completed and produced a value.
    Completed(T),
    /// The bank wants a TAN before it will answer.
    TanRequired,
}

/// Booked-balance inquiry for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRequest {
    /// Account to query.
    pub account: Account,
    /// Ask the bank for a fresh balance instead of a cached one.
    pub force_refresh: bool,
}

impl BalanceRequest {
    /// Fresh booked-balance request.
    #[must_use]
    pub const fn fresh(account: Account) -> Self {
        Self {
            account,
            force_refresh: true,
        }
    }
}

/// Statement-of-account inquiry for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRequest {
    /// Account to query.
    pub account: Account,
    /// Inclusive date range.
    pub range: DateRange,
    /// Whether the client may pause for a TAN. Always `false` here.
    pub interactive: bool,
    /// Whether transaction details are requested.
    pub include_details: bool,
}

impl StatementRequest {
    /// Non-interactive request including transaction details.
    #[must_use]
    pub const fn detailed(account: Account, range: DateRange) -> Self {
        Self {
            account,
            range,
            interactive: false,
            include_details: true,
        }
    }
}

/// Fault raised by the banking client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankingError {
    /// The bank could not be reached or the connection broke.
    #[error("connection to bank failed: {0}")]
    Transport(String),

    /// The bank answered with an error return code.
    #[error("bank rejected request ({code}): {message}")]
    Rejected {
        /// FinTS return code, e.g. `9910`.
        code: String,
        /// Bank-supplied text.
        message: String,
    },

    /// The dialog is in a state the requested call is not valid for, or the
    /// response could not be interpreted.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The gateway has no bank to talk to.
    #[error("no banking connector configured")]
    NotConfigured,
}

/// Opens banking dialogs.
#[async_trait]
pub trait BankingConnector: Send + Sync {
    /// Session type produced by this connector.
    type Session: BankingSession;

    /// Open a fresh dialog with the bank.
    async fn open_dialog(
        &self,
        credentials: &BankCredentials,
        product: &ProductIdentity,
    ) -> Result<Self::Session, BankingError>;
}

/// One open dialog with the bank.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BankingSession: Send {
    /// Select the second-factor mode for the rest of the dialog.
    async fn select_tan_mode(&mut self, mode: TanMode) -> Result<(), BankingError>;

    /// Authenticate with the credentials the dialog was opened with.
    async fn login(&mut self) -> Result<ActionOutcome<()>, BankingError>;

    /// List SEPA accounts in bank order.
    async fn discover_accounts(&mut self) -> Result<ActionOutcome<Vec<Account>>, BankingError>;

    /// Fetch balance entries for an account.
    async fn get_balance(
        &mut self,
        request: &BalanceRequest,
    ) -> Result<ActionOutcome<Vec<Balance>>, BankingError>;

    /// Fetch statements for an account.
    async fn get_statement(
        &mut self,
        request: &StatementRequest,
    ) -> Result<ActionOutcome<Vec<Statement>>, BankingError>;

    /// End the dialog.
    async fn end_dialog(&mut self) -> Result<(), BankingError>;
}
