use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Eurolytics backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::event_stream,
        crate::routes::auth::login,
        crate::routes::auth::register,
        crate::routes::quiz::list_quizzes,
        crate::routes::quiz::start_session,
        crate::routes::quiz::get_session,
        crate::routes::quiz::select_option,
        crate::routes::quiz::advance,
        crate::routes::quiz::exit_session,
        crate::routes::quiz::retry,
        crate::routes::ranking::ranking,
        crate::routes::ranking::position,
        crate::routes::profile::profile,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::RegisterRequest,
            crate::dto::auth::UserView,
            crate::dto::quiz::StartSessionRequest,
            crate::dto::quiz::SelectOptionRequest,
            crate::dto::quiz::QuizSummary,
            crate::dto::quiz::SessionView,
            crate::dto::ranking::RankingResponse,
            crate::dto::ranking::PositionResponse,
            crate::dto::profile::ProfileResponse,
            crate::state::state_machine::SessionPhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "auth", description = "Login and registration"),
        (name = "quiz", description = "Quiz catalogue and session lifecycle"),
        (name = "ranking", description = "Leaderboards and positions"),
        (name = "profile", description = "User profiles and badges"),
    )
)]
pub struct ApiDoc;
