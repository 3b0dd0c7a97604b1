//! Attachment transfer core for Ferry.
//!
//! This crate moves issue attachments between the local filesystem and a
//! remote issue tracker. It has ZERO HTTP dependencies: the tracker is
//! reached through the [`remote::AttachmentBackend`] trait.
//!
//! # Modules
//!
//! - `attachment` - Single and batch transfers, content inlining, results
//! - `remote` - Contract for the remote issue tracker and its errors

pub mod attachment;
pub mod remote;
