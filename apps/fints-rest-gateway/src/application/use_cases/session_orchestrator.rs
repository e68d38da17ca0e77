//! Session Orchestrator Use Case
//!
//! Drives one banking dialog per inquiry through the fixed sequence
//! TAN mode selection -> login -> account discovery -> action, and folds
//! every outcome into an `OrchestrationResult`.
//!
//! The handshake is strictly sequential: each step depends on dialog state
//! established by the previous one. Nothing is retried; a TAN demand at any
//! step ends the inquiry and names that step.

use std::sync::Arc;

use crate::application::ports::{
    ActionOutcome, BalanceRequest, BankingConnector, BankingError, BankingSession,
    ProductIdentity, StatementRequest, TanMode,
};
use crate::domain::banking::{Account, BankCredentials, DateRange};
use crate::domain::session::{
    BalanceSnapshot, FailureReason, OrchestrationResult, SessionStep, StatementHistory,
};

/// Use case running balance and statement inquiries against the bank.
pub struct SessionOrchestrator<C>
where
    C: BankingConnector,
{
    connector: Arc<C>,
    product: ProductIdentity,
    tan_mode: TanMode,
}

impl<C> SessionOrchestrator<C>
where
    C: BankingConnector,
{
    /// Create an orchestrator presenting the gateway's product identity.
    pub fn new(connector: Arc<C>) -> Self {
        Self {
            connector,
            product: ProductIdentity::default(),
            tan_mode: TanMode::default(),
        }
    }

    /// Fetch the booked balance of the first discovered account.
    #[tracing::instrument(skip_all, fields(inquiry = "balance"))]
    pub async fn run_balance_inquiry(&self, credentials: &BankCredentials) -> OrchestrationResult {
        let mut session = match self.open_dialog(credentials).await {
            Ok(session) => session,
            Err(reason) => return reason.into(),
        };

        let outcome = self.balance_handshake(&mut session).await;
        end_dialog(&mut session).await;

        let result = match outcome {
            Ok(snapshot) => OrchestrationResult::BalanceRetrieved(snapshot),
            Err(reason) => OrchestrationResult::Failed(reason),
        };
        log_result(&result);
        result
    }

    /// Fetch all statements of the first discovered account within `range`.
    #[tracing::instrument(skip_all, fields(inquiry = "statement", from = %range.from(), to = %range.to()))]
    pub async fn run_statement_inquiry(
        &self,
        credentials: &BankCredentials,
        range: DateRange,
    ) -> OrchestrationResult {
        let mut session = match self.open_dialog(credentials).await {
            Ok(session) => session,
            Err(reason) => return reason.into(),
        };

        let outcome = self.statement_handshake(&mut session, range).await;
        end_dialog(&mut session).await;

        let result = match outcome {
            Ok(history) => OrchestrationResult::StatementsRetrieved(history),
            Err(reason) => OrchestrationResult::Failed(reason),
        };
        log_result(&result);
        result
    }

    async fn open_dialog(&self, credentials: &BankCredentials) -> Result<C::Session, FailureReason> {
        tracing::debug!(
            bank_code = credentials.bank_code(),
            product = %self.product.name,
            "Opening banking dialog"
        );

        self.connector
            .open_dialog(credentials, &self.product)
            .await
            .map_err(|e| {
                let reason = protocol_error(&e);
                log_result(&OrchestrationResult::Failed(reason.clone()));
                reason
            })
    }

    async fn balance_handshake(
        &self,
        session: &mut C::Session,
    ) -> Result<BalanceSnapshot, FailureReason> {
        let account = self.select_account(session).await?;

        tracing::debug!("Requesting booked balance");
        let request = BalanceRequest::fresh(account);
        let balances = completed(
            session.get_balance(&request).await,
            SessionStep::Balance,
        )?;

        let balance = balances
            .into_iter()
            .next()
            .ok_or(FailureReason::NoBalanceAvailable)?;

        Ok(BalanceSnapshot {
            account: request.account,
            balance,
        })
    }

    async fn statement_handshake(
        &self,
        session: &mut C::Session,
        range: DateRange,
    ) -> Result<StatementHistory, FailureReason> {
        let account = self.select_account(session).await?;

        tracing::debug!("Requesting statement of account");
        let request = StatementRequest::detailed(account, range);
        let statements = completed(
            session.get_statement(&request).await,
            SessionStep::Statement,
        )?;

        if statements.is_empty() {
            return Err(FailureReason::NoStatementsAvailable);
        }

        Ok(StatementHistory {
            account: request.account,
            range,
            statements,
        })
    }

    /// Shared prefix: TAN mode, login, account discovery. Returns the first
    /// account the bank lists.
    async fn select_account(&self, session: &mut C::Session) -> Result<Account, FailureReason> {
        session
            .select_tan_mode(self.tan_mode)
            .await
            .map_err(|e| protocol_error(&e))?;
        tracing::debug!(tan_mode = self.tan_mode.as_str(), "TAN mode selected");

        completed(session.login().await, SessionStep::Login)?;
        tracing::debug!("Logged in");

        let accounts = completed(session.discover_accounts().await, SessionStep::Accounts)?;
        tracing::debug!(count = accounts.len(), "Accounts discovered");

        accounts
            .into_iter()
            .next()
            .ok_or(FailureReason::NoAccountsFound)
    }
}

fn completed<T>(
    result: Result<ActionOutcome<T>, BankingError>,
    step: SessionStep,
) -> Result<T, FailureReason> {
    match result {
        Ok(ActionOutcome::Completed(value)) => Ok(value),
        Ok(ActionOutcome::TanRequired) => Err(FailureReason::SecondFactorRequired(step)),
        Err(e) => Err(protocol_error(&e)),
    }
}

fn protocol_error(err: &BankingError) -> FailureReason {
    FailureReason::ProtocolError(err.to_string())
}

async fn end_dialog<S: BankingSession>(session: &mut S) {
    if let Err(e) = session.end_dialog().await {
        tracing::warn!(error = %e, "Failed to end banking dialog");
    }
}

fn log_result(result: &OrchestrationResult) {
    match result {
        OrchestrationResult::BalanceRetrieved(_) => tracing::info!("Balance inquiry completed"),
        OrchestrationResult::StatementsRetrieved(history) => tracing::info!(
            statements = history.statements.len(),
            "Statement inquiry completed"
        ),
        OrchestrationResult::Failed(FailureReason::SecondFactorRequired(step)) => {
            tracing::warn!(step = step.as_str(), "Bank demanded a TAN");
        }
        OrchestrationResult::Failed(FailureReason::ProtocolError(message)) => {
            tracing::error!(error = %message, "Banking dialog failed");
        }
        OrchestrationResult::Failed(reason) => {
            tracing::info!(reason = reason.label(), "Inquiry returned no data");
        }
    }
}
