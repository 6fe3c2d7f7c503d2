//! Business logic services for the accounts server.
//!
//! # Services
//!
//! - `auth` - User directory (account creation, credential checks) and token issuance

pub mod auth;
