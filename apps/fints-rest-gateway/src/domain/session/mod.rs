//! Banking Session Outcomes
//!
//! The result model of one banking handshake. A handshake either produces a
//! fully populated success value or exactly one `FailureReason`; it is never
//! partially populated.

use serde::Deserialize;

use super::banking::{Account, Balance, DateRange, Statement};

// =============================================================================
// Session Steps
// =============================================================================

/// A step of the handshake that may demand a second factor (TAN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStep {
    /// Dialog login.
    Login,
    /// SEPA account discovery.
    Accounts,
    /// Balance inquiry.
    Balance,
    /// Statement of account inquiry.
    Statement,
}

impl SessionStep {
    /// Step name used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Accounts => "accounts",
            Self::Balance => "balance",
            Self::Statement => "statement",
        }
    }

    /// Human-readable description of what the bank wanted a TAN for.
    #[must_use]
    pub const fn tan_purpose(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Accounts => "account access",
            Self::Balance => "balance inquiry",
            Self::Statement => "transaction inquiry",
        }
    }
}

// =============================================================================
// Failure Reasons
// =============================================================================

/// Why a banking inquiry did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    /// Bank credentials are incomplete; no dialog was opened.
    #[error("FinTS configuration incomplete")]
    ConfigIncomplete,
    /// The bank demanded a TAN at the given step.
    #[error("TAN required for {}", .0.tan_purpose())]
    SecondFactorRequired(SessionStep),
    /// Account discovery returned nothing.
    #[error("No accounts found")]
    NoAccountsFound,
    /// The balance inquiry returned no entries.
    #[error("No balance information available")]
    NoBalanceAvailable,
    /// The statement inquiry returned no statements.
    #[error("No transaction statements available")]
    NoStatementsAvailable,
    /// Any other fault raised by the banking client.
    #[error("{0}")]
    ProtocolError(String),
}

impl FailureReason {
    /// Short machine label for metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ConfigIncomplete => "config_incomplete",
            Self::SecondFactorRequired(_) => "second_factor_required",
            Self::NoAccountsFound => "no_accounts",
            Self::NoBalanceAvailable => "no_balance",
            Self::NoStatementsAvailable => "no_statements",
            Self::ProtocolError(_) => "protocol_error",
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// Successful balance inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshot {
    /// The account the balance belongs to.
    pub account: Account,
    /// First balance entry reported by the bank.
    pub balance: Balance,
}

/// Successful statement inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementHistory {
    /// The account the statements belong to.
    pub account: Account,
    /// The requested range.
    pub range: DateRange,
    /// Statements in bank order.
    pub statements: Vec<Statement>,
}

/// Terminal outcome of one banking handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestrationResult {
    /// Balance inquiry succeeded.
    BalanceRetrieved(BalanceSnapshot),
    /// Statement inquiry succeeded.
    StatementsRetrieved(StatementHistory),
    /// The handshake stopped early.
    Failed(FailureReason),
}

impl OrchestrationResult {
    /// Whether this is a success variant.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// The failure reason, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Outcome label for metrics.
    #[must_use]
    pub const fn outcome_label(&self) -> &'static str {
        match self {
            Self::BalanceRetrieved(_) | Self::StatementsRetrieved(_) => "success",
            Self::Failed(reason) => reason.label(),
        }
    }
}

impl From<FailureReason> for OrchestrationResult {
    fn from(reason: FailureReason) -> Self {
        Self::Failed(reason)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_factor_message_names_step() {
        assert_eq!(
            FailureReason::SecondFactorRequired(SessionStep::Login).to_string(),
            "TAN required for login"
        );
        assert_eq!(
            FailureReason::SecondFactorRequired(SessionStep::Accounts).to_string(),
            "TAN required for account access"
        );
        assert_eq!(
            FailureReason::SecondFactorRequired(SessionStep::Statement).to_string(),
            "TAN required for transaction inquiry"
        );
    }

    #[test]
    fn empty_result_messages() {
        assert_eq!(FailureReason::NoAccountsFound.to_string(), "No accounts found");
        assert_eq!(
            FailureReason::NoBalanceAvailable.to_string(),
            "No balance information available"
        );
        assert_eq!(
            FailureReason::NoStatementsAvailable.to_string(),
            "No transaction statements available"
        );
    }

    #[test]
    fn session_step_parses_lowercase() {
        let step: SessionStep = serde_json::from_str("\"accounts\"").unwrap();
        assert_eq!(step, SessionStep::Accounts);
    }

    #[test]
    fn failed_result_is_not_success() {
        let result = OrchestrationResult::from(FailureReason::NoAccountsFound);
        assert!(!result.is_success());
        assert_eq!(result.failure(), Some(&FailureReason::NoAccountsFound));
        assert_eq!(result.outcome_label(), "no_accounts");
    }
}
