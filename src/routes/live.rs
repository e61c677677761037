use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        common::LiveSnapshot,
        live::{FriendlyRequest, GoalRequest, LiveActionResponse, PenaltyRequest, PeriodEndRequest},
    },
    error::AppError,
    routes::owner::require_owner,
    services::live_service,
    state::{OwnerSession, SharedState},
};

/// Live-play endpoints, all scoped to the owner named by `X-Owner-Id`.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/live/matches/{id}", post(open_match))
        .route("/live/friendly", post(open_friendly))
        .route("/live/{session}", get(snapshot).delete(close_session))
        .route("/live/{session}/clock/start", post(start_clock))
        .route("/live/{session}/clock/pause", post(pause_clock))
        .route("/live/{session}/goals", post(adjust_goal))
        .route("/live/{session}/period/end", post(end_period))
        .route("/live/{session}/penalties", post(take_penalty))
        .route("/live/{session}/end", post(end_match))
        .route("/live/{session}/reopen", post(reopen_match))
        .route_layer(middleware::from_fn(require_owner))
}

/// Open a stored match for live play.
#[utoipa::path(
    post,
    path = "/live/matches/{id}",
    tag = "live",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses(
        (status = 200, description = "Live session opened", body = LiveSnapshot),
        (status = 403, description = "Match belongs to another owner"),
        (status = 404, description = "Unknown match"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn open_match(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(id): Path<Uuid>,
) -> Result<Json<LiveSnapshot>, AppError> {
    Ok(Json(live_service::open_match(&state, session, id).await?))
}

/// Open a friendly match that is never persisted.
#[utoipa::path(
    post,
    path = "/live/friendly",
    tag = "live",
    params(("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner")),
    request_body = FriendlyRequest,
    responses((status = 200, description = "Friendly session opened", body = LiveSnapshot))
)]
pub async fn open_friendly(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Valid(Json(payload)): Valid<Json<FriendlyRequest>>,
) -> Result<Json<LiveSnapshot>, AppError> {
    Ok(Json(
        live_service::open_friendly(&state, session, payload).await?,
    ))
}

/// Current scoreboard state of a live session.
#[utoipa::path(
    get,
    path = "/live/{session}",
    tag = "live",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("session" = Uuid, Path, description = "Live session identifier")
    ),
    responses(
        (status = 200, description = "Session state", body = LiveSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn snapshot(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<LiveSnapshot>, AppError> {
    Ok(Json(
        live_service::snapshot(&state, session, session_id).await?,
    ))
}

/// Start the countdown.
#[utoipa::path(
    post,
    path = "/live/{session}/clock/start",
    tag = "live",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("session" = Uuid, Path, description = "Live session identifier")
    ),
    responses(
        (status = 200, description = "Countdown running", body = LiveActionResponse),
        (status = 409, description = "Match closed")
    )
)]
pub async fn start_clock(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<LiveActionResponse>, AppError> {
    Ok(Json(
        live_service::start_clock(&state, session, session_id).await?,
    ))
}

/// Pause the countdown.
#[utoipa::path(
    post,
    path = "/live/{session}/clock/pause",
    tag = "live",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("session" = Uuid, Path, description = "Live session identifier")
    ),
    responses(
        (status = 200, description = "Countdown paused", body = LiveActionResponse),
        (status = 409, description = "Match closed")
    )
)]
pub async fn pause_clock(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<LiveActionResponse>, AppError> {
    Ok(Json(
        live_service::pause_clock(&state, session, session_id).await?,
    ))
}

/// Add or remove one goal.
#[utoipa::path(
    post,
    path = "/live/{session}/goals",
    tag = "live",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("session" = Uuid, Path, description = "Live session identifier")
    ),
    request_body = GoalRequest,
    responses(
        (status = 200, description = "Score updated", body = LiveActionResponse),
        (status = 400, description = "Delta other than +1/-1"),
        (status = 409, description = "Goal rejected in the current phase")
    )
)]
pub async fn adjust_goal(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(session_id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<GoalRequest>>,
) -> Result<Json<LiveActionResponse>, AppError> {
    Ok(Json(
        live_service::adjust_goal(&state, session, session_id, payload.side, payload.delta)
            .await?,
    ))
}

/// End the current period ahead of the countdown.
#[utoipa::path(
    post,
    path = "/live/{session}/period/end",
    tag = "live",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("session" = Uuid, Path, description = "Live session identifier")
    ),
    request_body = PeriodEndRequest,
    responses(
        (status = 200, description = "Next phase entered", body = LiveActionResponse),
        (status = 409, description = "Not confirmed or no period to end")
    )
)]
pub async fn end_period(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<PeriodEndRequest>,
) -> Result<Json<LiveActionResponse>, AppError> {
    Ok(Json(
        live_service::end_period(&state, session, session_id, payload.confirm).await?,
    ))
}

/// Record one shoot-out kick.
#[utoipa::path(
    post,
    path = "/live/{session}/penalties",
    tag = "live",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("session" = Uuid, Path, description = "Live session identifier")
    ),
    request_body = PenaltyRequest,
    responses(
        (status = 200, description = "Kick recorded", body = LiveActionResponse),
        (status = 409, description = "Not in a shoot-out, out of turn or already decided")
    )
)]
pub async fn take_penalty(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<PenaltyRequest>,
) -> Result<Json<LiveActionResponse>, AppError> {
    Ok(Json(
        live_service::take_penalty(&state, session, session_id, payload.side, payload.converted)
            .await?,
    ))
}

/// Close the match, or retry the final write of a closed match.
#[utoipa::path(
    post,
    path = "/live/{session}/end",
    tag = "live",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("session" = Uuid, Path, description = "Live session identifier")
    ),
    responses(
        (status = 200, description = "Match closed", body = LiveActionResponse),
        (status = 409, description = "Already closed or shoot-out undecided")
    )
)]
pub async fn end_match(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<LiveActionResponse>, AppError> {
    Ok(Json(
        live_service::end_match(&state, session, session_id).await?,
    ))
}

/// Reopen a closed match.
#[utoipa::path(
    post,
    path = "/live/{session}/reopen",
    tag = "live",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("session" = Uuid, Path, description = "Live session identifier")
    ),
    responses(
        (status = 200, description = "Match reopened", body = LiveActionResponse),
        (status = 409, description = "Match is not closed"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn reopen_match(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<LiveActionResponse>, AppError> {
    Ok(Json(
        live_service::reopen_match(&state, session, session_id).await?,
    ))
}

/// Stop the countdown and forget the session.
#[utoipa::path(
    delete,
    path = "/live/{session}",
    tag = "live",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("session" = Uuid, Path, description = "Live session identifier")
    ),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn close_session(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    live_service::close_session(&state, session, session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
