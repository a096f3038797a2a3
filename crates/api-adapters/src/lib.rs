//! # api-adapters
//!
//! HTTP surface of goalboard. The axum router lives behind the `web-axum`
//! feature; query-string parsing and the pagination envelope are plain
//! serde and always compiled.

pub mod pagination;
pub mod query;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;

#[cfg(feature = "web-axum")]
pub use app::{router, AppState};

#[cfg(feature = "web-axum")]
mod app {
    use std::sync::Arc;

    use axum::{
        middleware::from_fn_with_state,
        routing::{get, post},
        Router,
    };
    use tower_http::{
        cors::CorsLayer,
        request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
        trace::TraceLayer,
    };

    use services::Services;

    use crate::handlers::{accounts, boards, categories, comments, goals, health};
    use crate::middleware::{require_auth, MakeRequestUuidV7};

    /// State shared by every handler.
    #[derive(Clone)]
    pub struct AppState {
        pub services: Arc<Services>,
    }

    impl AppState {
        pub fn new(services: Services) -> Self {
            Self {
                services: Arc::new(services),
            }
        }
    }

    /// Builds the full application: public account and health routes, and
    /// everything under `/goals` plus `/core/profile` behind bearer auth.
    pub fn router(state: AppState) -> Router {
        let protected = Router::new()
            .merge(boards::router())
            .merge(categories::router())
            .merge(goals::router())
            .merge(comments::router())
            .route("/core/profile", get(accounts::profile))
            .route_layer(from_fn_with_state(state.clone(), require_auth));

        Router::new()
            .route("/health", get(health::health))
            .route("/core/signup", post(accounts::signup))
            .route("/core/login", post(accounts::login))
            .merge(protected)
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}
