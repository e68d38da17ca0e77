//! Configuration Module
//!
//! Configuration loading and the credential provider.

mod settings;

pub use settings::{
    ConfigError, CredentialProvider, FintsSettings, GatewayConfig, GatewaySecret, SandboxSource,
    ServerSettings,
};
