//! HTTP surface — thin wrappers that translate between JSON bodies and
//! the core engine. All decisions (validation, precedence, routing,
//! atomicity) live in `ccew-core`; handlers only map errors to status
//! codes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use ccew_core::{CcewEngine, CcewError, UpstreamPayload, UserInput, ValidationError};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::render;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CcewEngine>,
    pub public_base_url: String,
}

// ─── Response shapes ──────────────────────────────────────────

#[derive(Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub session_id: Uuid,
    pub form_url: String,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub recipient: String,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Maps core errors onto status codes and a structured JSON body.
pub struct ApiError(pub CcewError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CcewError::NotFound { .. } => StatusCode::NOT_FOUND,
            CcewError::AlreadyCompleted { .. } | CcewError::SubmissionInFlight { .. } => {
                StatusCode::CONFLICT
            }
            CcewError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CcewError::Distribution(_) => StatusCode::BAD_GATEWAY,
        };
        let field = match &self.0 {
            CcewError::Validation(ValidationError::MissingField { field })
            | CcewError::Validation(ValidationError::InvalidField { field, .. }) => {
                Some(field.clone())
            }
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            error: self.0.to_string(),
            field,
        };
        (status, Json(body)).into_response()
    }
}

impl From<CcewError> for ApiError {
    fn from(err: CcewError) -> Self {
        ApiError(err)
    }
}

// ─── Handlers ─────────────────────────────────────────────────

pub async fn status() -> Json<Value> {
    Json(json!({
        "status": "online",
        "service": "CCEW API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /api/ccew/generate` — create a session from an upstream job
/// payload and hand back the technician's form link.
pub async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<GenerateResponse>, Response> {
    let upstream = match payload {
        Value::Object(map) => UpstreamPayload(map),
        _ => {
            let body = ErrorBody {
                success: false,
                error: "expected a JSON object payload".to_string(),
                field: None,
            };
            return Err((StatusCode::BAD_REQUEST, Json(body)).into_response());
        }
    };

    let outcome = state
        .engine
        .generate(upstream)
        .await
        .map_err(|e| ApiError(e).into_response())?;
    Ok(Json(GenerateResponse {
        success: true,
        session_id: outcome.session_id,
        form_url: format!("{}/form/{}", state.public_base_url, outcome.session_id),
    }))
}

/// `GET /form/{id}` — the pre-filled technician form.
pub async fn show_form(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Html<String>, Response> {
    match state.engine.store().get(session_id).await {
        Ok(session) => Ok(Html(render::render_form(&session))),
        Err(CcewError::NotFound { .. }) => Err((
            StatusCode::NOT_FOUND,
            Html("Invalid or expired session".to_string()),
        )
            .into_response()),
        Err(other) => Err(ApiError(other).into_response()),
    }
}

/// `POST /api/ccew/submit/{id}` — submit the completed form and
/// distribute the certificate.
pub async fn submit(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let input = match payload {
        Value::Object(map) => UserInput(map.into_iter().collect()),
        _ => UserInput::default(),
    };
    let outcome = state.engine.submit(session_id, input).await?;
    Ok(Json(SubmitResponse {
        success: true,
        recipient: outcome.recipient,
    }))
}

pub async fn success() -> Html<&'static str> {
    Html(render::SUCCESS_PAGE)
}
