use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::MailSender;
use crate::error::MailError;
use crate::models::{OutboundEmail, Sender};

// SendGrid v3 mail/send request format
#[derive(Serialize, Debug)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: &'a Sender,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Serialize, Debug)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize, Debug)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

impl<'a> From<&'a OutboundEmail> for MailSendRequest<'a> {
    fn from(message: &'a OutboundEmail) -> Self {
        Self {
            personalizations: [Personalization {
                to: [Address { email: &message.to }],
            }],
            from: &message.from,
            subject: &message.subject,
            content: [Content {
                kind: "text/html",
                value: &message.html,
            }],
        }
    }
}

pub struct SendGridClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SendGridClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl MailSender for SendGridClient {
    async fn send(&self, message: &OutboundEmail) -> Result<(), MailError> {
        let res = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&MailSendRequest::from(message))
            .send()
            .await?;

        // SendGrid answers 202 Accepted
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Mail accepted by provider");
        Ok(())
    }
}
