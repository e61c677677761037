use axum::Router;

use crate::state::SharedState;

pub mod bracket;
pub mod docs;
pub mod fixtures;
pub mod health;
pub mod live;
pub mod owner;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(live::router())
        .merge(bracket::router())
        .merge(fixtures::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig, dao::match_store::memory::MemoryMatchStore,
        routes::owner::OWNER_HEADER, state::AppState,
    };

    fn post(uri: &str, owner: Uuid, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(OWNER_HEADER, owner.to_string())
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn healthcheck_is_public() {
        let app = router(AppState::new(AppConfig::default()));
        let response = app
            .oneshot(Request::builder().uri("/healthcheck").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn friendly_flow_over_http() {
        let state = AppState::new(AppConfig::default());
        let owner = Uuid::new_v4();

        let response = router(state.clone())
            .oneshot(post("/live/friendly", owner, "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.session_count(), 1);
    }

    #[tokio::test]
    async fn invalid_goal_delta_is_a_bad_request() {
        let state = AppState::new(AppConfig::default());
        let owner = Uuid::new_v4();
        let uri = format!("/live/{}/goals", Uuid::new_v4());

        let response = router(state)
            .oneshot(post(&uri, owner, r#"{ "side": "a", "delta": 3 }"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let state = AppState::new(AppConfig::default());
        let uri = format!("/live/{}/clock/start", Uuid::new_v4());

        let response = router(state)
            .oneshot(post(&uri, Uuid::new_v4(), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn degraded_bracket_is_unavailable() {
        let state = AppState::new(AppConfig::default());
        let uri = format!("/tournaments/{}/bracket", Uuid::new_v4());
        let request = Request::builder()
            .uri(uri)
            .header(OWNER_HEADER, Uuid::new_v4().to_string())
            .body(Body::empty())
            .unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn imported_tournament_has_a_bracket() {
        let state = AppState::new(AppConfig::default());
        state
            .set_match_store(std::sync::Arc::new(MemoryMatchStore::new()))
            .await;
        let owner = Uuid::new_v4();
        let tournament_id = Uuid::new_v4();
        let team = |name: &str| {
            serde_json::json!({
                "id": Uuid::new_v4(),
                "name": name,
                "abbreviation": name,
                "primary_color": "#ffffff",
                "secondary_color": "#000000",
                "detail_color": "#ff0000"
            })
        };
        let body = serde_json::json!({
            "tournaments": [{
                "id": tournament_id,
                "owner_id": owner,
                "name": "Copa",
                "format": "elimination",
                "half_duration_minutes": 20,
                "extra_time": false,
                "extra_time_minutes": 5,
                "penalty_kicks": 5,
                "two_legged": false,
                "team_count": 2
            }],
            "matches": [{
                "id": Uuid::new_v4(),
                "tournament_id": tournament_id,
                "pairing_id": "1",
                "team_a": team("AAA"),
                "team_b": team("BBB"),
                "is_elimination": true,
                "stage": "Final"
            }]
        });

        let response = router(state.clone())
            .oneshot(post("/fixtures", owner, &body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::builder()
            .uri(format!("/tournaments/{tournament_id}/bracket"))
            .header(OWNER_HEADER, owner.to_string())
            .body(Body::empty())
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn fixtures_for_another_owner_are_forbidden() {
        let state = AppState::new(AppConfig::default());
        state
            .set_match_store(std::sync::Arc::new(MemoryMatchStore::new()))
            .await;
        let body = serde_json::json!({
            "tournaments": [{
                "id": Uuid::new_v4(),
                "owner_id": Uuid::new_v4(),
                "name": "Copa",
                "format": "elimination",
                "half_duration_minutes": 20,
                "extra_time": false,
                "extra_time_minutes": 5,
                "penalty_kicks": 5,
                "two_legged": false
            }]
        });

        let response = router(state)
            .oneshot(post("/fixtures", Uuid::new_v4(), &body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
