//! Domain models for the accounts server.

pub mod token;
pub mod user;

pub use token::Token;
pub use user::{NewUser, User};
