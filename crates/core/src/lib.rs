//! Recipe Accounts Core - Shared types library.
//!
//! This crate provides common types used across all Recipe Accounts components:
//! - `server` - JSON API for account creation and token login
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, account kinds and token digests

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
