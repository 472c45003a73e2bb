use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::GridConfig;
use crate::layout::{DayLayout, WeekLayout, layout_day, layout_week};
use crate::model::{DayId, GridPayload};
use crate::slot::{CandidateSlot, DraftTimes, click_ratio, resolve_grid_click};
use crate::time::TimeOfDay;
use crate::validation::{ShiftValidationError, validate_payload};

#[derive(Clone)]
pub struct AppState {
    payload: Arc<RwLock<GridPayload>>,
    config: Arc<GridConfig>,
}

impl AppState {
    pub fn new(payload: GridPayload, config: GridConfig) -> Self {
        Self {
            payload: Arc::new(RwLock::new(payload)),
            config: Arc::new(config),
        }
    }

    pub fn with_shared(payload: Arc<RwLock<GridPayload>>, config: GridConfig) -> Self {
        Self {
            payload,
            config: Arc::new(config),
        }
    }

    fn payload(&self) -> Arc<RwLock<GridPayload>> {
        self.payload.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ShiftValidationError> for ApiError {
    fn from(value: ShiftValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        tracing::debug!(%status, error, %message, "request rejected");
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct LayoutRequest {
    payload: GridPayload,
    #[serde(default)]
    day_id: Option<DayId>,
}

/// Either a ready ratio or a pixel offset inside a grid body of `height` pixels.
#[derive(Debug, Deserialize)]
struct SlotRequest {
    #[serde(default)]
    ratio: Option<f64>,
    #[serde(default)]
    offset_y: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SlotResponse {
    slot: CandidateSlot,
    start_time: TimeOfDay,
    draft: DraftTimes,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/grid", get(get_grid).put(replace_grid))
        .route("/week", get(get_week))
        .route("/days/:day_id/layout", get(get_day_layout))
        .route("/layout", post(post_layout))
        .route("/slot", post(post_slot))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    payload: GridPayload,
    config: GridConfig,
) -> std::io::Result<()> {
    let state = AppState::new(payload, config);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "layout service listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_grid(State(state): State<AppState>) -> Json<GridPayload> {
    let payload = state.payload();
    let snapshot = payload.read().clone();
    Json(snapshot)
}

async fn replace_grid(
    State(state): State<AppState>,
    Json(incoming): Json<GridPayload>,
) -> Result<Json<GridPayload>, ApiError> {
    validate_payload(&incoming)?;
    let payload = state.payload();
    {
        let mut guard = payload.write();
        *guard = incoming;
    }
    let current = payload.read().clone();
    tracing::info!(shifts = current.shifts.len(), "grid replaced");
    Ok(Json(current))
}

async fn get_week(State(state): State<AppState>) -> Json<WeekLayout> {
    let payload = state.payload();
    let week = {
        let guard = payload.read();
        layout_week(&guard, &state.config)
    };
    Json(week)
}

async fn get_day_layout(
    State(state): State<AppState>,
    Path(day_id): Path<DayId>,
) -> Result<Json<DayLayout>, ApiError> {
    let payload = state.payload();
    let layout = {
        let guard = payload.read();
        layout_day(&guard, day_id, &state.config)
    };
    layout
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("day {day_id} not found")))
}

async fn post_layout(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<DayLayout>, ApiError> {
    let payload = request.payload;
    validate_payload(&payload)?;
    let day_id = match request.day_id {
        Some(day_id) => day_id,
        None => payload
            .first_day()
            .map(|day| day.id)
            .ok_or_else(|| ApiError::invalid("payload has no days"))?,
    };
    layout_day(&payload, day_id, &state.config)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("day {day_id} not found")))
}

async fn post_slot(
    State(state): State<AppState>,
    Json(request): Json<SlotRequest>,
) -> Result<Json<SlotResponse>, ApiError> {
    let ratio = match (request.ratio, request.offset_y, request.height) {
        (Some(ratio), _, _) => ratio,
        (None, Some(offset_y), Some(height)) => click_ratio(offset_y, height),
        _ => return Err(ApiError::invalid("expected `ratio` or `offset_y` with `height`")),
    };
    if !ratio.is_finite() {
        return Err(ApiError::invalid("ratio must be a finite number"));
    }

    let payload = state.payload();
    let (window, hours) = {
        let guard = payload.read();
        (guard.time_window(&state.config), guard.operating_hours())
    };
    let slot = resolve_grid_click(ratio, &window, hours.as_ref(), &state.config);
    let draft = DraftTimes::from_slot(slot, hours.as_ref(), &state.config);
    Ok(Json(SlotResponse {
        slot,
        start_time: slot.time(),
        draft,
    }))
}
