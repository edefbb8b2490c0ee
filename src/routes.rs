use std::{path::Path, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, Path as UrlPath, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::debug;
use uuid::Uuid;

use crate::{
    activity::{ActivityPost, ActivityResponse},
    calendar::{CalendarError, CalendarEvent},
    error::AppError,
    euler::{Direction, EulerProblem, ProblemChange},
    state::AppState,
};

pub fn router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(index_handler))
        .route("/activities/get", get(list_activities_handler))
        .route("/activities/insert", post(insert_activity_handler))
        .route("/activities/delete", post(delete_activity_handler))
        .route("/calendar/events", get(calendar_events_handler))
        .route("/project-euler/get-problem", get(get_problem_handler))
        .route("/project-euler/:direction", post(change_problem_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    Html(state.index_html.to_string())
}

async fn list_activities_handler(
    State(state): State<AppState>,
) -> Result<Json<ActivityResponse>, AppError> {
    let activities = state.activities.list().await?;
    Ok(Json(ActivityResponse { activities }))
}

async fn insert_activity_handler(
    State(state): State<AppState>,
    Json(payload): Json<ActivityPost>,
) -> Result<StatusCode, AppError> {
    let activity = state.activities.insert(&payload.activity.name).await?;
    debug!(id = %activity.id, name = %activity.name, "activity inserted");
    Ok(StatusCode::OK)
}

async fn delete_activity_handler(
    State(state): State<AppState>,
    Json(payload): Json<ActivityPost>,
) -> Result<StatusCode, AppError> {
    let id: Uuid = payload
        .activity
        .id
        .trim()
        .parse()
        .map_err(|e| AppError::MalformedPayload(format!("activity id: {e}")))?;

    let deleted = state.activities.delete(id).await?;
    debug!(%id, deleted, "activity deleted");
    Ok(StatusCode::OK)
}

async fn calendar_events_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    let calendar = state.calendar.as_ref().ok_or(CalendarError::NotConfigured)?;
    Ok(Json(calendar.upcoming_events().await?))
}

async fn get_problem_handler(
    State(state): State<AppState>,
) -> Result<Json<EulerProblem>, AppError> {
    Ok(Json(state.euler.get_current().await?))
}

/// The body is optional, but one that is sent as JSON must decode.
async fn change_problem_handler(
    State(state): State<AppState>,
    UrlPath(direction): UrlPath<Direction>,
    body: Result<Json<ProblemChange>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let change = match body {
        Ok(Json(change)) => change,
        Err(JsonRejection::MissingJsonContentType(_)) => ProblemChange::default(),
        Err(rejection) => return Err(AppError::MalformedPayload(rejection.body_text())),
    };
    if let Some(number) = change.number {
        debug!(%direction, requested_from = number, "changing project euler problem");
    }

    state.euler.change(direction).await?;
    Ok(StatusCode::OK)
}
