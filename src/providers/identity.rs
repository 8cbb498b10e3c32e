use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{IdentityProvider, TokenSource};
use crate::error::IdentityError;
use crate::models::LinkSettings;

// sendOobCode request format
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
    return_oob_link: bool,
    continue_url: &'a str,
    can_handle_code_in_app: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    android_package_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    android_install_app: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    android_minimum_version: Option<&'a str>,
}

impl<'a> OobCodeRequest<'a> {
    fn verify_email(email: &'a str, settings: &'a LinkSettings) -> Self {
        let android = settings.android.as_ref();
        Self {
            request_type: "VERIFY_EMAIL",
            email,
            return_oob_link: true,
            continue_url: &settings.continue_url,
            can_handle_code_in_app: settings.handle_code_in_app,
            android_package_name: android.map(|a| a.package_name.as_str()),
            android_install_app: android.map(|a| a.install_app),
            android_minimum_version: android.map(|a| a.minimum_version.as_str()),
        }
    }
}

// sendOobCode response format
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OobCodeResponse {
    #[serde(default)]
    oob_link: Option<String>,
}

/// Google Identity Toolkit client, the REST service behind Firebase Auth.
///
/// Authenticates with OAuth2 access tokens for a service account that may
/// call `accounts:sendOobCode` with `returnOobLink`, so the link comes back in
/// the response instead of being mailed by the provider itself.
pub struct IdentityToolkitClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    tokens: Arc<dyn TokenSource>,
}

impl IdentityToolkitClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/projects/{}/accounts:sendOobCode",
            self.base_url, self.project_id
        )
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn generate_email_verification_link(
        &self,
        email: &str,
        settings: &LinkSettings,
    ) -> Result<String, IdentityError> {
        let body = OobCodeRequest::verify_email(email, settings);
        let access_token = self.tokens.access_token().await?;

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(&access_token)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            // revoked or expired early, mint a new one next time
            warn!(project = %self.project_id, "Identity provider refused the access token");
            self.tokens.invalidate().await;
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = res.json::<OobCodeResponse>().await?;
        debug!(project = %self.project_id, "Verification link generated");

        parsed
            .oob_link
            .filter(|link| !link.is_empty())
            .ok_or(IdentityError::MissingLink)
    }
}
