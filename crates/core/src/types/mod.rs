//! Core types for Recipe Accounts.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod email;
pub mod id;
pub mod token;

pub use account::AccountKind;
pub use email::{Email, EmailError};
pub use id::*;
pub use token::TokenDigest;
