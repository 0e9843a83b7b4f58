//! Core library for SeniorHub.
//!
//! - `config`: environment-driven application configuration
//! - `models`: authenticated user, session and dashboard types
//! - `storage`: key-value session store with file, keyring and memory backends
//! - `auth`: popup-style OAuth sign-in state machine and transports
//! - `api`: HTTP client for the SeniorHub backend
//! - `shell`: session lifecycle glue used by front-ends

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod shell;
pub mod storage;

pub use config::Config;
pub use models::{AuthenticatedUser, HouseholdStatus, Session};
pub use shell::{SessionShell, ShellView};

#[cfg(test)]
pub(crate) mod test_support;
