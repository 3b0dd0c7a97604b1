//! Remote access capability consumed by the transfer core.
//!
//! The issue tracker is an external collaborator. This module only fixes the
//! contract the core relies on:
//! - Issue lookup restricted to attachment metadata
//! - Authenticated streaming GET of attachment content
//! - Attachment creation from a local file
//!
//! The HTTP implementation lives in the `ferry-jira` crate.

mod backend;
mod error;
#[cfg(test)]
pub(crate) mod fake;

pub use backend::{AttachmentBackend, ByteStream};
pub use error::RemoteError;
