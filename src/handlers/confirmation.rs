use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{ApiError, EMAIL_REQUIRED, INVALID_BODY};
use crate::metrics::{
    DISPATCH_FAILURES, DISPATCH_LATENCY, EMAILS_SENT, RATE_LIMITED, REQUEST_TOTAL,
    TRACKED_IDENTIFIERS,
};
use crate::models::{MessageBody, SendConfirmationRequest};
use crate::rate_limit::Decision;
use crate::state::AppState;

pub const EMAIL_SENT: &str = "Correo enviado";

pub async fn send_confirmation_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendConfirmationRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    REQUEST_TOTAL.inc();

    // serde detail goes to the log only
    let Json(payload) = payload.map_err(|rejection| {
        info!(reason = %rejection.body_text(), "Rejected request body");
        ApiError::Validation(INVALID_BODY.to_string())
    })?;

    let email = payload
        .email()
        .ok_or_else(|| ApiError::Validation(EMAIL_REQUIRED.to_string()))?;

    let decision = state.tracker.check_and_record(email, Instant::now());
    TRACKED_IDENTIFIERS.set(state.tracker.len() as f64);

    if let Decision::Denied(reason) = decision {
        RATE_LIMITED.inc();
        warn!(
            email = %email,
            reason = ?reason,
            max_attempts = state.tracker.max_attempts(),
            "Verification request rate limited"
        );
        return Err(ApiError::RateLimited);
    }

    // the attempt stays counted even if dispatch fails
    let start_time = Instant::now();
    let result = state.dispatcher.dispatch(email).await;
    DISPATCH_LATENCY.observe(start_time.elapsed().as_secs_f64());

    match result {
        Ok(_) => {
            EMAILS_SENT.inc();
            Ok(Json(MessageBody {
                message: EMAIL_SENT.to_string(),
            }))
        }
        Err(err) => {
            DISPATCH_FAILURES.inc();
            Err(ApiError::from(err))
        }
    }
}
