use axum::{Extension, Json, Router, extract::State, middleware, routing::post};
use axum_valid::Valid;

use crate::{
    dto::fixtures::{FixtureBundle, ImportSummary},
    error::AppError,
    routes::owner::require_owner,
    services::fixture_service,
    state::{OwnerSession, SharedState},
};

/// Bulk import of the owner's tournaments and matches.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/fixtures", post(import_fixtures))
        .route_layer(middleware::from_fn(require_owner))
}

/// Create or replace tournaments and matches owned by the caller.
#[utoipa::path(
    post,
    path = "/fixtures",
    tag = "fixtures",
    params(("X-Owner-Id" = String, Header, description = "Identifier of the signed-in owner")),
    request_body = FixtureBundle,
    responses(
        (status = 200, description = "Records written", body = ImportSummary),
        (status = 400, description = "Invalid tournament settings or match without tournament"),
        (status = 403, description = "A record belongs to another owner"),
        (status = 404, description = "Unknown tournament referenced by a match"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn import_fixtures(
    State(state): State<SharedState>,
    Extension(session): Extension<OwnerSession>,
    Valid(Json(bundle)): Valid<Json<FixtureBundle>>,
) -> Result<Json<ImportSummary>, AppError> {
    Ok(Json(
        fixture_service::import_for_owner(&state, session, bundle).await?,
    ))
}
