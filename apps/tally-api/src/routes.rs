use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post, put},
};
use serde::Serialize;

use tally_service::{
	AskRequest, AskResponse, HealthResponse, IngestReport, IngestRequest, SearchRequest,
	SearchResponse, ServiceError,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/documents", put(index_documents))
		.route("/v1/search", post(search))
		.route("/v1/ask", post(ask))
		.with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(state.service.health().await)
}

async fn index_documents(
	State(state): State<AppState>,
	Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestReport>, ApiError> {
	let response = state.service.index_documents(payload)?;

	Ok(Json(response))
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload)?;

	Ok(Json(response))
}

async fn ask(
	State(state): State<AppState>,
	Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
	let response = state.service.ask(payload).await?;

	Ok(Json(response))
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

impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match &err {
			ServiceError::InvalidRequest { .. } => {
				Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_request", err.to_string())
			},
			ServiceError::IndexNotBuilt => {
				Self::new(StatusCode::CONFLICT, "index_not_built", err.to_string())
			},
			ServiceError::Provider { .. } => {
				Self::new(StatusCode::BAD_GATEWAY, "provider_error", err.to_string())
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
