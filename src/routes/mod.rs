use axum::Router;

use crate::state::SharedState;

pub mod auth;
pub mod docs;
pub mod health;
pub mod profile;
pub mod quiz;
pub mod ranking;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(auth::router())
        .merge(quiz::router())
        .merge(ranking::router())
        .merge(profile::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
