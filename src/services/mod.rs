/// Login and registration flows.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Badge catalogue evaluation against activity aggregates.
pub mod gamification;
/// Health check service.
pub mod health_service;
/// Profile assembly combining user data, history and badges.
pub mod profile_service;
/// Quiz session lifecycle and countdown management.
pub mod quiz_service;
/// Leaderboard assembly and department aggregation.
pub mod ranking_service;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
