//! Fixture-backed bank connector.
//!
//! Answers the banking handshake from a JSON fixture instead of a live FinTS
//! server. It enforces the same step order a real dialog does, so a session
//! that skips login or the TAN mode selection fails the way a bank would.
//!
//! ```json
//! {
//!   "accounts": [{"number": "1234567", "iban": "DE02...", "bic": "BYLADEM1001", "blz": "12030000"}],
//!   "balances": [{"amount": "1234.56", "currency": "EUR", "as_of": "2024-03-31T00:00:00Z"}],
//!   "statements": [],
//!   "expected_pin": "12345",
//!   "tan_required_at": "balance",
//!   "fault": {"step": "login", "message": "bank unavailable"}
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Days, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::ports::{
    ActionOutcome, BalanceRequest, BankingConnector, BankingError, BankingSession,
    ProductIdentity, StatementRequest, TanMode,
};
use crate::domain::banking::{
    Account, Balance, BankCredentials, CreditDebit, Statement, Transaction,
};
use crate::domain::session::SessionStep;

/// Canned bank data and scripted behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SandboxFixture {
    /// Accounts returned by discovery, in bank order.
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Balance entries returned for any account.
    #[serde(default)]
    pub balances: Vec<Balance>,
    /// Statements; filtered by the requested range.
    #[serde(default)]
    pub statements: Vec<Statement>,
    /// PIN the dialog must be opened with. Any PIN is accepted when unset.
    #[serde(default)]
    pub expected_pin: Option<String>,
    /// Step at which the bank demands a TAN.
    #[serde(default)]
    pub tan_required_at: Option<SessionStep>,
    /// Step at which the bank fails.
    #[serde(default)]
    pub fault: Option<SandboxFault>,
}

/// Scripted bank failure.
#[derive(Debug, Clone, Deserialize)]
pub struct SandboxFault {
    /// Step that fails.
    pub step: SessionStep,
    /// Message reported by the bank.
    pub message: String,
}

/// Error loading a fixture file.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The file could not be read.
    #[error("failed to read sandbox fixture {path}: {source}")]
    Io {
        /// Fixture path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not a valid fixture.
    #[error("invalid sandbox fixture {path}: {source}")]
    Parse {
        /// Fixture path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// `BankingConnector` serving a `SandboxFixture`.
#[derive(Debug)]
pub struct SandboxBank {
    fixture: Arc<SandboxFixture>,
    dialogs_opened: AtomicUsize,
}

impl SandboxBank {
    /// Serve the given fixture.
    #[must_use]
    pub fn new(fixture: SandboxFixture) -> Self {
        Self {
            fixture: Arc::new(fixture),
            dialogs_opened: AtomicUsize::new(0),
        }
    }

    /// Load a fixture from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SandboxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fixture = serde_json::from_str(&raw).map_err(|source| SandboxError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(fixture))
    }

    /// Demo data dated relative to `today`: one account, one balance and
    /// statements inside and outside the default 30-day window.
    #[must_use]
    pub fn demo(today: NaiveDate) -> Self {
        Self::new(demo_fixture(today))
    }

    /// Number of dialogs opened so far.
    pub fn dialogs_opened(&self) -> usize {
        self.dialogs_opened.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BankingConnector for SandboxBank {
    type Session = SandboxSession;

    async fn open_dialog(
        &self,
        credentials: &BankCredentials,
        product: &ProductIdentity,
    ) -> Result<Self::Session, BankingError> {
        self.dialogs_opened.fetch_add(1, Ordering::Relaxed);

        if product.name.is_empty() {
            return Err(BankingError::Rejected {
                code: "9078".to_string(),
                message: "product not registered".to_string(),
            });
        }

        if self
            .fixture
            .expected_pin
            .as_deref()
            .is_some_and(|expected| expected != credentials.pin())
        {
            return Err(BankingError::Rejected {
                code: "9931".to_string(),
                message: "PIN invalid".to_string(),
            });
        }

        tracing::debug!(
            bank_code = credentials.bank_code(),
            product = %product.name,
            "Sandbox dialog opened"
        );

        Ok(SandboxSession {
            fixture: Arc::clone(&self.fixture),
            tan_mode: None,
            logged_in: false,
            closed: false,
        })
    }
}

/// One dialog against the sandbox.
#[derive(Debug)]
pub struct SandboxSession {
    fixture: Arc<SandboxFixture>,
    tan_mode: Option<TanMode>,
    logged_in: bool,
    closed: bool,
}

impl SandboxSession {
    /// Apply scripted faults and TAN demands for `step`.
    fn enter(&self, step: SessionStep) -> Result<bool, BankingError> {
        if self.closed {
            return Err(BankingError::Protocol("dialog already ended".to_string()));
        }
        if let Some(fault) = self.fixture.fault.as_ref().filter(|f| f.step == step) {
            return Err(BankingError::Rejected {
                code: "9800".to_string(),
                message: fault.message.clone(),
            });
        }
        Ok(self.fixture.tan_required_at == Some(step))
    }

    fn require_login(&self) -> Result<(), BankingError> {
        if self.logged_in {
            Ok(())
        } else {
            Err(BankingError::Protocol("dialog not initialized".to_string()))
        }
    }

    fn require_known(&self, account: &Account) -> Result<(), BankingError> {
        if self.fixture.accounts.contains(account) {
            Ok(())
        } else {
            Err(BankingError::Rejected {
                code: "9210".to_string(),
                message: format!("unknown account {}", account.number),
            })
        }
    }
}

#[async_trait]
impl BankingSession for SandboxSession {
    async fn select_tan_mode(&mut self, mode: TanMode) -> Result<(), BankingError> {
        self.tan_mode = Some(mode);
        Ok(())
    }

    async fn login(&mut self) -> Result<ActionOutcome<()>, BankingError> {
        if self.tan_mode.is_none() {
            return Err(BankingError::Protocol("no TAN mode selected".to_string()));
        }
        if self.enter(SessionStep::Login)? {
            return Ok(ActionOutcome::TanRequired);
        }
        self.logged_in = true;
        Ok(ActionOutcome::Completed(()))
    }

    async fn discover_accounts(&mut self) -> Result<ActionOutcome<Vec<Account>>, BankingError> {
        self.require_login()?;
        if self.enter(SessionStep::Accounts)? {
            return Ok(ActionOutcome::TanRequired);
        }
        Ok(ActionOutcome::Completed(self.fixture.accounts.clone()))
    }

    async fn get_balance(
        &mut self,
        request: &BalanceRequest,
    ) -> Result<ActionOutcome<Vec<Balance>>, BankingError> {
        self.require_login()?;
        self.require_known(&request.account)?;
        if self.enter(SessionStep::Balance)? {
            return Ok(ActionOutcome::TanRequired);
        }
        Ok(ActionOutcome::Completed(self.fixture.balances.clone()))
    }

    async fn get_statement(
        &mut self,
        request: &StatementRequest,
    ) -> Result<ActionOutcome<Vec<Statement>>, BankingError> {
        self.require_login()?;
        self.require_known(&request.account)?;
        if self.enter(SessionStep::Statement)? {
            return Ok(ActionOutcome::TanRequired);
        }

        let statements = self
            .fixture
            .statements
            .iter()
            .filter(|s| request.range.contains(s.date))
            .cloned()
            .collect();
        Ok(ActionOutcome::Completed(statements))
    }

    async fn end_dialog(&mut self) -> Result<(), BankingError> {
        self.closed = true;
        self.logged_in = false;
        Ok(())
    }
}

fn demo_fixture(today: NaiveDate) -> SandboxFixture {
    let days_ago = |n: u64| today.checked_sub_days(Days::new(n)).unwrap_or(today);
    let as_of = today
        .and_hms_opt(0, 0, 0)
        .map_or_else(Utc::now, |midnight| Utc.from_utc_datetime(&midnight));

    let transaction = |amount: Decimal,
                       credit_debit: CreditDebit,
                       booking_text: &str,
                       name: &str,
                       description: &str,
                       booked_on: NaiveDate| Transaction {
        booked: true,
        amount,
        credit_debit,
        booking_text: booking_text.to_string(),
        payee_or_payer_name: name.to_string(),
        description: description.to_string(),
        end_to_end_id: format!("SANDBOX-{}", booked_on.format("%Y%m%d")),
        valuta_date: Some(booked_on),
        booking_date: Some(booked_on),
    };

    SandboxFixture {
        accounts: vec![Account {
            number: "1234567890".to_string(),
            iban: "DE89370400440532013000".to_string(),
            bic: "COBADEFFXXX".to_string(),
            blz: "37040044".to_string(),
            sub_account_number: None,
        }],
        balances: vec![Balance {
            amount: Decimal::new(254_312, 2),
            currency: "EUR".to_string(),
            as_of,
        }],
        statements: vec![
            Statement {
                date: days_ago(45),
                start_balance: Decimal::new(198_000, 2),
                credit_debit: CreditDebit::Credit,
                transactions: vec![transaction(
                    Decimal::new(4_500, 2),
                    CreditDebit::Debit,
                    "KARTENZAHLUNG",
                    "Buchhandlung am Markt",
                    "Kartenzahlung",
                    days_ago(45),
                )],
            },
            Statement {
                date: days_ago(20),
                start_balance: Decimal::new(193_500, 2),
                credit_debit: CreditDebit::Credit,
                transactions: vec![
                    transaction(
                        Decimal::new(320_000, 2),
                        CreditDebit::Credit,
                        "LOHN/GEHALT",
                        "Example GmbH",
                        "Gehalt",
                        days_ago(20),
                    ),
                    transaction(
                        Decimal::new(95_000, 2),
                        CreditDebit::Debit,
                        "DAUERAUFTRAG",
                        "Hausverwaltung Nord",
                        "Miete",
                        days_ago(20),
                    ),
                ],
            },
            Statement {
                date: days_ago(3),
                start_balance: Decimal::new(418_500, 2),
                credit_debit: CreditDebit::Credit,
                transactions: vec![transaction(
                    Decimal::new(164_188, 2),
                    CreditDebit::Debit,
                    "LASTSCHRIFT",
                    "Stadtwerke",
                    "Jahresabrechnung",
                    days_ago(3),
                )],
            },
        ],
        ..SandboxFixture::default()
    }
}
