use axum::{
	Json, Router,
	extract::{
		Path, Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use newsdesk_domain::{DateRange, TagSelection};
use newsdesk_service::{Error as ServiceError, QueryRequest, SearchSession, SessionView};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/indices", get(indices))
		.route("/v1/date-range", get(date_range))
		.route("/v1/sessions", post(open_session))
		.route("/v1/sessions/{id}", get(view_session).delete(close_session))
		.route("/v1/sessions/{id}/search", post(search))
		.route("/v1/sessions/{id}/recent", post(recent))
		.route("/v1/sessions/{id}/selection", put(select))
		.with_state(state)
}

#[derive(Debug, Serialize)]
pub struct IndicesResponse {
	pub indices: Vec<String>,
	pub default: String,
}

#[derive(Debug, Deserialize)]
pub struct IndexParams {
	pub index: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DateRangeResponse {
	pub index: String,
	#[serde(flatten)]
	pub range: DateRange,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenSessionRequest {
	pub index: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
	pub page: Option<usize>,
	pub per_page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentRequest {
	pub page_size: Option<u32>,
}

async fn health() -> Json<Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

async fn indices(State(state): State<AppState>) -> Json<IndicesResponse> {
	let cfg = &state.service.cfg;

	Json(IndicesResponse {
		indices: cfg.elasticsearch.indices.clone(),
		default: cfg.default_index().to_string(),
	})
}

async fn date_range(
	State(state): State<AppState>,
	params: Result<Query<IndexParams>, QueryRejection>,
) -> Result<Json<DateRangeResponse>, ApiError> {
	let Query(params) = params?;
	let index = state.service.resolve_index(params.index.as_deref())?;
	let range = state.service.resolve_date_range(&index).await;

	Ok(Json(DateRangeResponse { index, range }))
}

async fn open_session(
	State(state): State<AppState>,
	payload: Result<Option<Json<OpenSessionRequest>>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
	let payload = payload?.map(|Json(payload)| payload).unwrap_or_default();
	let session = state.service.open_session(payload.index.as_deref()).await?;
	let view = render(&state, &session, ViewParams::default());

	tracing::info!(session_id = %session.id, index = %session.index, "Session opened.");

	state.insert(session);

	Ok((StatusCode::CREATED, Json(view)))
}

async fn view_session(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	params: Result<Query<ViewParams>, QueryRejection>,
) -> Result<Json<SessionView>, ApiError> {
	let Query(params) = params?;
	let session = load_session(&state, id)?;

	Ok(Json(render(&state, &session, params)))
}

async fn search(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
	let Json(request) = payload?;
	let session = load_session(&state, id)?;
	let session = state.service.search(session, request).await?;

	Ok(Json(commit(&state, session)?))
}

async fn recent(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	payload: Result<Option<Json<RecentRequest>>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
	let payload = payload?.map(|Json(payload)| payload).unwrap_or_default();
	let session = load_session(&state, id)?;
	let session = state.service.recent(session, payload.page_size).await;

	Ok(Json(commit(&state, session)?))
}

async fn select(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	payload: Result<Json<TagSelection>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
	let Json(selection) = payload?;
	let session = load_session(&state, id)?.with_selection(selection);

	Ok(Json(commit(&state, session)?))
}

async fn close_session(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
	state.remove(id).ok_or_else(|| session_not_found(id))?;

	tracing::info!(session_id = %id, "Session closed.");

	Ok(StatusCode::NO_CONTENT)
}

fn load_session(state: &AppState, id: Uuid) -> Result<SearchSession, ApiError> {
	state.session(id).ok_or_else(|| session_not_found(id))
}

/// Writes `session` back unless it was closed while the action was in flight.
fn commit(state: &AppState, session: SearchSession) -> Result<SessionView, ApiError> {
	let id = session.id;
	let view = render(state, &session, ViewParams::default());

	if !state.store(session) {
		return Err(session_not_found(id));
	}

	Ok(view)
}

fn render(state: &AppState, session: &SearchSession, params: ViewParams) -> SessionView {
	let search = &state.service.cfg.search;
	let per_page = params
		.per_page
		.unwrap_or(search.page_size as usize)
		.clamp(1, search.max_page_size as usize);

	session.view(params.page.unwrap_or(0), per_page)
}

fn session_not_found(id: Uuid) -> ApiError {
	json_error(StatusCode::NOT_FOUND, "session_not_found", format!("Unknown session '{id}'."))
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
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::Provider { message } =>
				json_error(StatusCode::BAD_GATEWAY, "search_service_error", message),
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text())
	}
}

impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}
