use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorBody;

pub const EMAIL_REQUIRED: &str = "Email requerido";
pub const INVALID_BODY: &str = "Cuerpo de solicitud inválido";
pub const TOO_MANY_ATTEMPTS: &str = "Demasiados intentos. Por favor, intenta más tarde.";
pub const SEND_FAILED: &str = "Error enviando correo";

/// Failure loading a service account or minting an access token from it.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("could not read service account key: {0}")]
    Read(#[from] std::io::Error),
    #[error("service account key is not valid: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("service account private key is unusable: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),
    #[error("token endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("token endpoint rejected the assertion with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Failure talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("no access token for the identity provider: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("identity provider rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("identity provider response carried no verification link")]
    MissingLink,
}

/// Failure talking to the mail-delivery provider.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("could not generate verification link")]
    LinkGenerationFailed(#[source] IdentityError),
    #[error("could not send verification email")]
    SendFailed(#[source] MailError),
}

/// Everything a request handler can answer with besides success.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("rate limited")]
    RateLimited,
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, TOO_MANY_ATTEMPTS.to_string()),
            ApiError::Dispatch(err) => {
                // provider details stay in the logs
                let cause = std::error::Error::source(err)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                error!(error = %err, cause = %cause, "Verification dispatch failed");
                (StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
