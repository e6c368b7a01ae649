use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    services::sse_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/events",
    responses((status = 200, description = "Realtime event stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime portal events to connected frontends.
pub async fn event_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    info!("New SSE connection");
    // The greeting is private to this client; already-connected streams
    // must not see someone else's handshake.
    let greeting = ServerEvent::json(
        Some("handshake".to_string()),
        &Handshake {
            message: "event stream connected".into(),
            degraded: state.is_degraded().await,
        },
    )
    .ok();
    sse_service::to_sse_stream(receiver, greeting)
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/events", get(event_stream))
}
