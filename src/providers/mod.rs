//! Outbound collaborators: the identity provider that mints verification
//! links and the mail provider that delivers them.

mod identity;
mod mail;
mod token;

pub use identity::IdentityToolkitClient;
pub use mail::SendGridClient;
pub use token::{ServiceAccountKey, ServiceAccountTokenSource, StaticToken, TokenSource};

use async_trait::async_trait;

use crate::error::{IdentityError, MailError};
use crate::models::{LinkSettings, OutboundEmail};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Ask the provider for a single-use email verification link.
    async fn generate_email_verification_link(
        &self,
        email: &str,
        settings: &LinkSettings,
    ) -> Result<String, IdentityError>;
}

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, message: &OutboundEmail) -> Result<(), MailError>;
}
