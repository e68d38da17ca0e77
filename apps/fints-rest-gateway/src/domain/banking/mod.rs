//! Banking Domain Types
//!
//! Accounts, balances and statements as reported by the bank. These types
//! are constructed fresh for every request and never persisted.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Credentials
// =============================================================================

/// Online-banking access data for one bank login.
///
/// Only constructed through the credential provider, which guarantees every
/// field is non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct BankCredentials {
    bank_url: String,
    bank_code: String,
    username: String,
    pin: String,
}

impl BankCredentials {
    /// Create credentials.
    #[must_use]
    pub const fn new(bank_url: String, bank_code: String, username: String, pin: String) -> Self {
        Self {
            bank_url,
            bank_code,
            username,
            pin,
        }
    }

    /// FinTS endpoint of the bank.
    #[must_use]
    pub fn bank_url(&self) -> &str {
        &self.bank_url
    }

    /// Bank institute code (BLZ).
    #[must_use]
    pub fn bank_code(&self) -> &str {
        &self.bank_code
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// PIN.
    #[must_use]
    pub fn pin(&self) -> &str {
        &self.pin
    }
}

impl std::fmt::Debug for BankCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankCredentials")
            .field("bank_url", &self.bank_url)
            .field("bank_code", &self.bank_code)
            .field("username", &"[REDACTED]")
            .field("pin", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Account
// =============================================================================

/// A SEPA account discovered during the banking dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// National account number.
    pub number: String,
    /// International bank account number.
    pub iban: String,
    /// Business identifier code of the account-holding bank.
    pub bic: String,
    /// German bank code (Bankleitzahl).
    pub blz: String,
    /// Sub-account characteristic, if the bank reports one.
    #[serde(default)]
    pub sub_account_number: Option<String>,
}

// =============================================================================
// Balance
// =============================================================================

/// Booked balance of an account at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Booked amount, signed.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Point in time the balance refers to.
    pub as_of: DateTime<Utc>,
}

// =============================================================================
// Statements
// =============================================================================

/// Whether an amount is credited to or debited from the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditDebit {
    /// Money in.
    Credit,
    /// Money out.
    Debit,
}

/// A single booked or pending transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// `false` for pending (not yet booked) entries.
    pub booked: bool,
    /// Unsigned amount; direction is given by `credit_debit`.
    pub amount: Decimal,
    /// Direction of the money flow.
    pub credit_debit: CreditDebit,
    /// Bank-supplied booking text, e.g. "SEPA-UEBERWEISUNG".
    pub booking_text: String,
    /// Name of the counterparty.
    pub payee_or_payer_name: String,
    /// Main remittance description.
    pub description: String,
    /// SEPA end-to-end reference.
    #[serde(default)]
    pub end_to_end_id: String,
    /// Value date.
    #[serde(default)]
    pub valuta_date: Option<NaiveDate>,
    /// Booking date.
    #[serde(default)]
    pub booking_date: Option<NaiveDate>,
}

/// One statement period of an account, as grouped by the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement date.
    pub date: NaiveDate,
    /// Balance at the start of the period (unsigned).
    pub start_balance: Decimal,
    /// Sign of the start balance.
    pub credit_debit: CreditDebit,
    /// Transactions in the order the bank returned them.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive calendar date range for statement inquiries.
///
/// The bounds are kept as requested. A range whose start lies after its end
/// contains no dates, so a statement inquiry over it finds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Default look-back window of the transactions endpoint.
    pub const DEFAULT_LOOKBACK_DAYS: u64 = 30;

    /// Create a range from its inclusive bounds.
    #[must_use]
    pub const fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// The range `[today - days, today]`.
    #[must_use]
    pub fn trailing_days(today: NaiveDate, days: u64) -> Self {
        let from = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    /// First day of the range.
    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last day of the range.
    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    /// Whether `date` lies inside the range (both ends inclusive).
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn credentials_redacted_debug() {
        let creds = BankCredentials::new(
            "https://banking.example/fints".to_string(),
            "12030000".to_string(),
            "jdoe".to_string(),
            "secret-pin".to_string(),
        );
        let debug = format!("{creds:?}");
        assert!(!debug.contains("jdoe"));
        assert!(!debug.contains("secret-pin"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("12030000"));
    }

    #[test]
    fn inverted_date_range_contains_nothing() {
        let range = DateRange::new(date(2024, 3, 10), date(2024, 3, 1));
        assert_eq!(range.from(), date(2024, 3, 10));
        assert!(!range.contains(date(2024, 3, 1)));
        assert!(!range.contains(date(2024, 3, 5)));
        assert!(!range.contains(date(2024, 3, 10)));
    }

    #[test]
    fn date_range_allows_single_day() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 1));
        assert!(range.contains(date(2024, 3, 1)));
        assert!(!range.contains(date(2024, 3, 2)));
    }

    #[test]
    fn trailing_days_spans_lookback() {
        let range = DateRange::trailing_days(date(2024, 3, 31), DateRange::DEFAULT_LOOKBACK_DAYS);
        assert_eq!(range.from(), date(2024, 3, 1));
        assert_eq!(range.to(), date(2024, 3, 31));
    }

    #[test]
    fn credit_debit_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CreditDebit::Debit).unwrap(),
            "\"debit\""
        );
    }

    #[test]
    fn transaction_deserializes_without_optional_dates() {
        let json = r#"{
            "booked": true,
            "amount": "12.50",
            "credit_debit": "debit",
            "booking_text": "KARTENZAHLUNG",
            "payee_or_payer_name": "Bakery",
            "description": "Bread"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount, Decimal::new(1250, 2));
        assert!(tx.valuta_date.is_none());
        assert!(tx.booking_date.is_none());
        assert!(tx.end_to_end_id.is_empty());
    }
}
