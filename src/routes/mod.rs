use axum::{Router, routing::get};

use crate::{AppState, middleware::auth_middleware};

pub mod health;
pub mod student;

pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/student/check-token", get(student::check_token))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .nest(&state.config.api_base_uri, protected_routes)
        .with_state(state)
}
