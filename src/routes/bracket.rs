use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::get,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    bracket::LayoutMetrics,
    dto::bracket::{BracketQuery, BracketResponse},
    error::AppError,
    routes::owner::require_owner,
    services::bracket_service,
    state::{OwnerSession, SharedState},
};

/// Bracket view of elimination tournaments.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/tournaments/{id}/bracket", get(tournament_bracket))
        .route_layer(middleware::from_fn(require_owner))
}

/// Aggregated ties of a tournament laid out as bracket columns with connectors.
#[utoipa::path(
    get,
    path = "/tournaments/{id}/bracket",
    tag = "bracket",
    params(
        ("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner"),
        ("id" = Uuid, Path, description = "Tournament identifier"),
        BracketQuery
    ),
    responses(
        (status = 200, description = "Bracket layout", body = BracketResponse),
        (status = 400, description = "Invalid layout metrics"),
        (status = 403, description = "Tournament belongs to another owner"),
        (status = 404, description = "Unknown tournament"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn tournament_bracket(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Path(id): Path<Uuid>,
    Valid(Query(query)): Valid<Query<BracketQuery>>,
) -> Result<Json<BracketResponse>, AppError> {
    let metrics = LayoutMetrics::from(&query);
    Ok(Json(
        bracket_service::bracket_for_tournament(&state, session, id, metrics).await?,
    ))
}
