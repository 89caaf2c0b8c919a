use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use batas_pipeline::{AskRequest, AskResponse, Error as PipelineError, MetricsSnapshot};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/ask", post(ask))
		.route("/v1/metrics", get(metrics))
		.route("/v1/metrics/reset", post(metrics_reset))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn ask(
	State(state): State<AppState>,
	Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
	let response = state.pipeline.ask(payload).await?;
	Ok(Json(response))
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
	Json(state.pipeline.metrics.snapshot())
}

async fn metrics_reset(State(state): State<AppState>) -> StatusCode {
	state.pipeline.metrics.reset();
	StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl From<PipelineError> for ApiError {
	fn from(err: PipelineError) -> Self {
		let (status, error_code) = match &err {
			PipelineError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			PipelineError::Provider { .. } => (StatusCode::BAD_GATEWAY, "provider_error"),
		};

		Self { status, error_code: error_code.to_string(), message: err.to_string() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
