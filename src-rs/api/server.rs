use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::{
    HeaderName, AUTHORIZATION, CONTENT_TYPE, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

use crate::api::handlers::{
    handle_health, handle_health_text, handle_messages, handle_not_found, handle_random,
    handle_random_text, handle_reset, handle_stats, AppState,
};
use crate::rotation::RotationStore;

pub struct MessageServer {
    pub addr: SocketAddr,
    pub state: AppState,
}

impl MessageServer {
    pub fn new(addr: SocketAddr, store: Arc<RotationStore>, admin_token: Option<String>) -> Self {
        Self {
            addr,
            state: AppState::new(store, admin_token),
        }
    }

    pub async fn start(&self) -> Result<(), String> {
        let app = router(self.state.clone());

        info!("listening on http://{}", self.addr);
        axum::Server::bind(&self.addr)
            .serve(app.into_make_service())
            .await
            .map_err(|err| err.to_string())
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/api/v1/random", get(handle_random))
        .route("/api/v1/random.txt", get(handle_random_text))
        .route("/api/v1/messages.json", get(handle_messages))
        .route("/api/v1/stats", get(handle_stats))
        .route("/api/v1/reset", post(handle_reset))
        .route("/healthz", get(handle_health))
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/health.txt", get(handle_health_text))
        .fallback(handle_not_found)
        .with_state(state)
        .layer(cors)
        .layer(security_header(X_FRAME_OPTIONS, "DENY"))
        .layer(security_header(X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(security_header(X_XSS_PROTECTION, "1; mode=block"))
        .layer(security_header(REFERRER_POLICY, "strict-origin-when-cross-origin"))
}

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
