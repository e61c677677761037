use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Matchday Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::live_stream,
        crate::routes::live::open_match,
        crate::routes::live::open_friendly,
        crate::routes::live::snapshot,
        crate::routes::live::start_clock,
        crate::routes::live::pause_clock,
        crate::routes::live::adjust_goal,
        crate::routes::live::end_period,
        crate::routes::live::take_penalty,
        crate::routes::live::end_match,
        crate::routes::live::reopen_match,
        crate::routes::live::close_session,
        crate::routes::bracket::tournament_bracket,
        crate::routes::fixtures::import_fixtures,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::LiveSnapshot,
            crate::dto::common::ShootoutView,
            crate::dto::common::PenaltyTally,
            crate::dto::common::TeamSummary,
            crate::dto::phase::VisibleMatchPhase,
            crate::dto::live::FriendlyRequest,
            crate::dto::live::GoalRequest,
            crate::dto::live::PeriodEndRequest,
            crate::dto::live::PenaltyRequest,
            crate::dto::live::LiveActionResponse,
            crate::dto::bracket::BracketResponse,
            crate::dto::bracket::ColumnView,
            crate::dto::bracket::SlotView,
            crate::dto::bracket::TieView,
            crate::dto::bracket::LegView,
            crate::dto::bracket::PairScore,
            crate::dto::bracket::DecidedByView,
            crate::dto::bracket::ConnectorView,
            crate::dto::bracket::PointView,
            crate::dto::fixtures::FixtureBundle,
            crate::dto::fixtures::ImportSummary,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::GoalEvent,
            crate::dto::sse::CueEvent,
            crate::dto::sse::NoticeEvent,
            crate::dto::sse::SessionClosedEvent,
            crate::state::match_clock::Side,
            crate::state::match_clock::Score,
            crate::state::match_clock::Cue,
            crate::state::rules::FriendlyPolicy,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "live", description = "Live match clock and scoring"),
        (name = "bracket", description = "Knockout bracket layout"),
        (name = "fixtures", description = "Bulk tournament and match import"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_live_and_bracket_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/healthcheck",
            "/sse/live",
            "/live/friendly",
            "/live/{session}/goals",
            "/tournaments/{id}/bracket",
            "/fixtures",
        ] {
            assert!(
                paths.iter().any(|path| path.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
