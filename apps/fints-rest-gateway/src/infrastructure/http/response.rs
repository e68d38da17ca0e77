//! HTTP response DTOs.
//!
//! Every JSON body the gateway emits is one of these records. Optional
//! values serialize as `null`, never omitted.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::banking::{Account, Balance, CreditDebit, DateRange, Statement, Transaction};
use crate::domain::session::{BalanceSnapshot, StatementHistory};

/// ISO 8601 timestamp with explicit offset, e.g. `2024-03-01T08:00:00+00:00`.
#[must_use]
pub fn iso8601(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Error body: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

/// Account block shared by both success envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Account number.
    pub number: String,
    /// IBAN.
    pub iban: String,
    /// BIC.
    pub bic: String,
    /// Bank code.
    pub blz: String,
    /// Sub-account characteristic.
    pub sub_account: Option<String>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            number: account.number.clone(),
            iban: account.iban.clone(),
            bic: account.bic.clone(),
            blz: account.blz.clone(),
            sub_account: account.sub_account_number.clone(),
        }
    }
}

/// Balance block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Booked amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Currency code.
    pub currency: String,
    /// Balance time, ISO 8601.
    pub timestamp: String,
}

impl From<&Balance> for BalanceResponse {
    fn from(balance: &Balance) -> Self {
        Self {
            amount: balance.amount,
            currency: balance.currency.clone(),
            timestamp: iso8601(balance.as_of),
        }
    }
}

/// `GET /api/balance` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceEnvelope {
    /// Always `true`.
    pub success: bool,
    /// Queried account.
    pub account: AccountResponse,
    /// Booked balance.
    pub balance: BalanceResponse,
    /// Response time, ISO 8601.
    pub timestamp: String,
}

impl BalanceEnvelope {
    /// Build the envelope for a snapshot.
    #[must_use]
    pub fn new(snapshot: &BalanceSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            success: true,
            account: AccountResponse::from(&snapshot.account),
            balance: BalanceResponse::from(&snapshot.balance),
            timestamp: iso8601(now),
        }
    }
}

/// Date range block, `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeResponse {
    /// First day.
    pub from: NaiveDate,
    /// Last day.
    pub to: NaiveDate,
}

impl From<DateRange> for DateRangeResponse {
    fn from(range: DateRange) -> Self {
        Self {
            from: range.from(),
            to: range.to(),
        }
    }
}

/// One transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Booked (`true`) or pending.
    pub booked: bool,
    /// Amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// `credit` or `debit`.
    pub credit_debit: CreditDebit,
    /// Booking text.
    pub booking_text: String,
    /// Counterparty name.
    pub name: String,
    /// Main description.
    pub description: String,
    /// SEPA end-to-end reference.
    #[serde(rename = "endToEndId")]
    pub end_to_end_id: String,
    /// Value date.
    pub valuta_date: Option<NaiveDate>,
    /// Booking date.
    pub booking_date: Option<NaiveDate>,
}

impl From<&Transaction> for TransactionResponse {
    fn from(tx: &Transaction) -> Self {
        Self {
            booked: tx.booked,
            amount: tx.amount,
            credit_debit: tx.credit_debit,
            booking_text: tx.booking_text.clone(),
            name: tx.payee_or_payer_name.clone(),
            description: tx.description.clone(),
            end_to_end_id: tx.end_to_end_id.clone(),
            valuta_date: tx.valuta_date,
            booking_date: tx.booking_date,
        }
    }
}

/// One statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    /// Statement date.
    pub date: NaiveDate,
    /// Start balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub start_balance: Decimal,
    /// Sign of the start balance.
    pub credit_debit: CreditDebit,
    /// Transactions in bank order.
    pub transactions: Vec<TransactionResponse>,
}

impl From<&Statement> for StatementResponse {
    fn from(statement: &Statement) -> Self {
        Self {
            date: statement.date,
            start_balance: statement.start_balance,
            credit_debit: statement.credit_debit,
            transactions: statement
                .transactions
                .iter()
                .map(TransactionResponse::from)
                .collect(),
        }
    }
}

/// `GET /api/transactions` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsEnvelope {
    /// Always `true`.
    pub success: bool,
    /// Queried account.
    pub account: AccountResponse,
    /// Effective range.
    pub date_range: DateRangeResponse,
    /// Statements in bank order.
    pub statements: Vec<StatementResponse>,
    /// Number of statements.
    pub total_statements: usize,
    /// Response time, ISO 8601.
    pub timestamp: String,
}

impl TransactionsEnvelope {
    /// Build the envelope for a statement history.
    #[must_use]
    pub fn new(history: &StatementHistory, now: DateTime<Utc>) -> Self {
        let statements: Vec<StatementResponse> = history
            .statements
            .iter()
            .map(StatementResponse::from)
            .collect();

        Self {
            success: true,
            account: AccountResponse::from(&history.account),
            date_range: DateRangeResponse::from(history.range),
            total_statements: statements.len(),
            statements,
            timestamp: iso8601(now),
        }
    }
}
