use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::mail::DeliveryOutcome;
use crate::models::{ContactRequest, ContactResponse};
use crate::state::AppState;

/// Contact routes
pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact))
}

/// POST /contact - Validate a submission and relay it by email
async fn submit_contact(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected contact body");
        AppError::BadRequest("Invalid request body".to_string())
    })?;

    let submission = request.validate().inspect_err(|err| {
        tracing::info!(missing = ?err.missing, "Contact submission missing fields");
    })?;

    tracing::info!(
        business_type = %submission.business_type,
        "Contact submission received"
    );

    // Delivery runs detached so a client hanging up doesn't cut an attempt short.
    let mailer = state.mailer.clone();
    let outcome = tokio::spawn(async move { mailer.send_contact(&submission).await }).await?;

    match outcome {
        DeliveryOutcome::Delivered { provider, .. } => Ok(Json(ContactResponse {
            success: true,
            message: "Email sent successfully".to_string(),
            provider: Some(provider),
        })),
        DeliveryOutcome::Exhausted { attempts } => Err(AppError::DeliveryFailed {
            attempts: attempts.len(),
        }),
        DeliveryOutcome::NotConfigured => Err(AppError::NotConfigured),
    }
}
