//! Application Layer
//!
//! - **Ports**: the banking client contract
//! - **Use Cases**: the session orchestrator

pub mod ports;
pub mod use_cases;

pub use ports::*;
pub use use_cases::*;
