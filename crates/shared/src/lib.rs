//! Shared configuration for Ferry.
//!
//! This crate provides the layered application configuration used by the
//! binary and handed down to the Jira client and the transfer core:
//! - Jira connection and authentication settings
//! - Transfer limits and defaults

pub mod config;

pub use config::{AppConfig, JiraConfig, TransferConfig};
