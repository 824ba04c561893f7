//! HTTP surface: JSON routes under `/api` and the push websocket at `/ws`.

pub mod error;
pub mod extract;
pub mod order;
pub mod stay;
pub mod ws;

use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::get,
};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    notify::PushHub,
    service::{OrderService, StayService},
};

use extract::LOGGEDIN_USER_HEADER;

#[derive(Debug, Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub stays: StayService,
    pub push: PushHub,
}

pub type SharedState = Arc<AppState>;

/// Body of a posted message; the author comes from the logged-in user.
#[derive(Debug, Deserialize)]
pub struct MsgBody {
    pub txt: String,
}

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(LOGGEDIN_USER_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .nest("/api/order", order::routes())
        .nest("/api/stay", stay::routes())
        .route("/ws", get(ws::ws_handler))
        .layer(cors)
        .with_state(state)
}
