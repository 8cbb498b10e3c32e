use std::sync::Arc;
use tracing::info;

use crate::email::verification_email;
use crate::error::DispatchError;
use crate::models::{LinkSettings, Sender};
use crate::providers::{IdentityProvider, MailSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sent;

/// Mints a verification link and mails it. One call to each provider per
/// dispatch, no retries.
pub struct VerificationDispatcher {
    identity: Arc<dyn IdentityProvider>,
    mailer: Arc<dyn MailSender>,
    link_settings: LinkSettings,
    sender: Sender,
}

impl VerificationDispatcher {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn MailSender>,
        link_settings: LinkSettings,
        sender: Sender,
    ) -> Self {
        Self {
            identity,
            mailer,
            link_settings,
            sender,
        }
    }

    pub async fn dispatch(&self, email: &str) -> Result<Sent, DispatchError> {
        let link = self
            .identity
            .generate_email_verification_link(email, &self.link_settings)
            .await
            .map_err(DispatchError::LinkGenerationFailed)?;

        // a link that fails to send is just dropped
        let message = verification_email(email, &self.sender, &link);
        self.mailer
            .send(&message)
            .await
            .map_err(DispatchError::SendFailed)?;

        info!(email = %email, "Verification email sent");
        Ok(Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IdentityError, MailError};
    use crate::models::OutboundEmail;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedLink(Option<&'static str>);

    #[async_trait]
    impl IdentityProvider for FixedLink {
        async fn generate_email_verification_link(
            &self,
            _email: &str,
            _settings: &LinkSettings,
        ) -> Result<String, IdentityError> {
            self.0.map(str::to_string).ok_or(IdentityError::MissingLink)
        }
    }

    #[derive(Default)]
    struct Outbox {
        fail: bool,
        sent: Mutex<Vec<OutboundEmail>>,
    }

    #[async_trait]
    impl MailSender for Outbox {
        async fn send(&self, message: &OutboundEmail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(message.clone());
            if self.fail {
                return Err(MailError::Rejected {
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(())
        }
    }

    fn dispatcher(link: Option<&'static str>, outbox: Arc<Outbox>) -> VerificationDispatcher {
        VerificationDispatcher::new(
            Arc::new(FixedLink(link)),
            outbox,
            LinkSettings {
                continue_url: "https://app.example/confirm".to_string(),
                handle_code_in_app: true,
                android: None,
            },
            Sender {
                email: "noreply@example.com".to_string(),
                name: "Team".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn sends_one_message_with_link() {
        let outbox = Arc::new(Outbox::default());
        let result = dispatcher(Some("https://link/abc"), outbox.clone())
            .dispatch("a@x.com")
            .await;

        assert_eq!(result.unwrap(), Sent);
        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@x.com");
        assert!(sent[0].html.contains("https://link/abc"));
    }

    #[tokio::test]
    async fn link_failure_skips_mail() {
        let outbox = Arc::new(Outbox::default());
        let result = dispatcher(None, outbox.clone()).dispatch("a@x.com").await;

        assert!(matches!(result, Err(DispatchError::LinkGenerationFailed(_))));
        assert!(outbox.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_failure_surfaces_as_send_failed() {
        let outbox = Arc::new(Outbox {
            fail: true,
            ..Default::default()
        });
        let result = dispatcher(Some("https://link/abc"), outbox)
            .dispatch("a@x.com")
            .await;

        assert!(matches!(result, Err(DispatchError::SendFailed(_))));
    }
}
