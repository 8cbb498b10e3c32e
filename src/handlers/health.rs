use axum::{Json, response::IntoResponse};

// liveness text
pub async fn root_handler() -> &'static str {
    "Servidor en Render funcionando"
}

pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
