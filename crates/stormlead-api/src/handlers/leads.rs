use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use stormlead_core::{AppError, Lead};
use utoipa::ToSchema;

/// Outcome of a lead submission
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitLeadResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "leadId", skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<i64>,
}

impl SubmitLeadResponse {
    fn saved(lead_id: i64) -> Self {
        Self {
            success: true,
            message: "Lead submitted successfully".to_string(),
            lead_id: Some(lead_id),
        }
    }

    fn failed() -> Self {
        Self {
            success: false,
            message: "Error saving lead".to_string(),
            lead_id: None,
        }
    }
}

/// Submit a new lead
///
/// Accepts any JSON object; the fields are stored as sent, plus a server-assigned
/// `id` and `submittedAt`.
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "leads",
    request_body(content = Object, description = "Lead fields (any JSON object)"),
    responses(
        (status = 200, description = "Lead stored", body = SubmitLeadResponse),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 500, description = "Lead could not be saved", body = SubmitLeadResponse)
    )
)]
#[tracing::instrument(skip(state, payload), fields(operation = "submit_lead"))]
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<Value>,
) -> Result<Response, HttpAppError> {
    let Value::Object(fields) = payload else {
        return Err(AppError::InvalidInput("Lead payload must be a JSON object".to_string()).into());
    };

    match state.lead_store.append(fields).await {
        Ok(lead) => {
            tracing::info!(lead_id = lead.id, "New lead received");
            Ok(Json(SubmitLeadResponse::saved(lead.id)).into_response())
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                path = %state.lead_store.location().display(),
                "Error saving lead"
            );
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitLeadResponse::failed()),
            )
                .into_response())
        }
    }
}

/// List all leads in submission order
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "leads",
    responses(
        (status = 200, description = "All stored leads", body = Vec<Lead>),
        (status = 500, description = "Lead storage could not be read", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_leads"))]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Value>>, HttpAppError> {
    let leads = state.lead_store.list_all().await.map_err(|e| {
        tracing::error!(error = %e, "Error reading leads");
        AppError::from(e)
    })?;

    tracing::debug!(count = leads.len(), "Listing leads");
    Ok(Json(leads))
}
