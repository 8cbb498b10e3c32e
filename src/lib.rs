//! Email verification relay.
//!
//! Accepts an address on `POST /send-confirmation`, asks the identity provider
//! for a verification link and mails it through the mail provider. Each address
//! gets a bounded number of attempts per sliding window.

pub mod config;
pub mod dispatcher;
pub mod email;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod rate_limit;
pub mod state;

pub use dispatcher::{Sent, VerificationDispatcher};
pub use error::{ApiError, DispatchError};
pub use rate_limit::{AttemptTracker, Decision, DenyReason};
pub use state::AppState;
