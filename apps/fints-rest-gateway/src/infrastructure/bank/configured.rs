//! Connector selection.
//!
//! The binary serves exactly one connector, chosen from configuration. When
//! no sandbox is configured the gateway has no bank: every dialog fails with
//! `BankingError::NotConfigured`, which callers see as a 500.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::application::ports::{BankingConnector, BankingError, ProductIdentity};
use crate::domain::banking::BankCredentials;
use crate::infrastructure::config::SandboxSource;

use super::sandbox::{SandboxBank, SandboxError, SandboxSession};

/// The bank connector the gateway was configured with.
#[derive(Debug)]
pub enum ConfiguredBank {
    /// Fixture-backed sandbox.
    Sandbox(SandboxBank),
    /// No connector; every dialog is refused.
    Unconfigured,
}

impl ConfiguredBank {
    /// Build the connector for `source`. Demo data is dated relative to
    /// `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if a fixture file cannot be read or parsed.
    pub fn from_source(
        source: Option<&SandboxSource>,
        today: NaiveDate,
    ) -> Result<Self, SandboxError> {
        let bank = match source {
            None => Self::Unconfigured,
            Some(SandboxSource::Demo) => Self::Sandbox(SandboxBank::demo(today)),
            Some(SandboxSource::Fixture(path)) => Self::Sandbox(SandboxBank::from_path(path)?),
        };
        Ok(bank)
    }

    /// Short name for startup logs.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Sandbox(_) => "sandbox",
            Self::Unconfigured => "none",
        }
    }
}

#[async_trait]
impl BankingConnector for ConfiguredBank {
    type Session = SandboxSession;

    async fn open_dialog(
        &self,
        credentials: &BankCredentials,
        product: &ProductIdentity,
    ) -> Result<Self::Session, BankingError> {
        match self {
            Self::Sandbox(bank) => bank.open_dialog(credentials, product).await,
            Self::Unconfigured => Err(BankingError::NotConfigured),
        }
    }
}
