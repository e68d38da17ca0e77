//! Bank Connectors (Driven Adapters)
//!
//! Implementations of the `BankingConnector` port.

mod configured;
mod sandbox;

pub use configured::ConfiguredBank;
pub use sandbox::{SandboxBank, SandboxError, SandboxFault, SandboxFixture, SandboxSession};
