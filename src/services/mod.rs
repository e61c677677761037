/// Ownership checks shared by the services.
pub mod access;
/// Bracket view of a tournament.
pub mod bracket_service;
/// Countdown task driving a live clock.
pub mod clock_ticker;
/// OpenAPI documentation generation.
pub mod documentation;
/// Bulk import of tournaments and matches.
pub mod fixture_service;
/// Health check service.
pub mod health_service;
/// Live-play orchestration and persistence.
pub mod live_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor with reconnect back-off.
pub mod storage_supervisor;
