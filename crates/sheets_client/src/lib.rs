//! Google Sheets client for book registrations.
//!
//! This crate is the single source of truth for the remote wire contract:
//! service-account token exchange, row append, row read.
//!
//! Blocking, sequential, no retries. Every failure is classified by stage
//! (auth, save, load) so callers can report it in one line.

mod client;
mod error;
pub mod token;

pub use client::SheetsClient;
pub use error::{Failure, SheetsError};
pub use token::AccessToken;
