//! Logging utilities.
//!
//! Centralizes logger initialization. Library code only talks to the `log`
//! facade; hosts that do not install their own logger call [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig};
