//! Jira REST implementation of the Ferry remote backend.
//!
//! This crate provides:
//! - `JiraClient`, an authenticated `reqwest` client implementing
//!   `ferry_core::remote::AttachmentBackend`
//! - `JiraBody`, a response body re-sliced into bounded chunks

mod body;
mod client;

pub use body::JiraBody;
pub use client::{JiraAuth, JiraClient};
