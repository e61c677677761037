use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::AppError, state::OwnerSession};

/// Header carrying the identifier of the signed-in owner.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Resolve the `X-Owner-Id` header into an [`OwnerSession`] request extension.
pub async fn require_owner(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let raw = req
        .headers()
        .get(OWNER_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing owner header `X-Owner-Id`".into()))?;

    let owner_id = Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Unauthorized("owner header `X-Owner-Id` is not a UUID".into()))?;

    req.extensions_mut().insert(OwnerSession::new(owner_id));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Router,
        http::StatusCode,
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(session): Extension<OwnerSession>| async move {
                    session.owner_id.to_string()
                }),
            )
            .route_layer(middleware::from_fn(require_owner))
    }

    fn request(owner: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(owner) = owner {
            builder = builder.header(OWNER_HEADER, owner);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_or_malformed_header_is_unauthorized() {
        for owner in [None, Some("not-a-uuid")] {
            let response = app().oneshot(request(owner)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn valid_header_reaches_the_handler() {
        let owner = Uuid::new_v4().to_string();
        let response = app().oneshot(request(Some(&owner))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
