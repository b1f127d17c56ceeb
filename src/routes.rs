use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::shared::{AppError, AppState};
use crate::{bookings, services, session};

pub const HEALTH_MESSAGE: &str = "Car-Doctor Server Is Running";

/// CORS policy: one allowed origin, cookies permitted
pub fn cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|_| AppError::Config(format!("invalid CORS origin: {origin}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

async fn health() -> &'static str {
    HEALTH_MESSAGE
}

/// Builds the full route table
pub fn app(state: AppState, cors: CorsLayer) -> Router {
    let require_session = middleware::from_fn_with_state(state.clone(), session::require_session);

    Router::new()
        .route("/", get(health))
        .route("/jwt", post(session::issue_token))
        .route("/logout", post(session::logout))
        .route("/services", get(services::list_services))
        .route("/services/:id", get(services::get_service))
        // route_layer only wraps the methods registered before it: GET is
        // protected, POST is not
        .route(
            "/bookings",
            get(bookings::list_bookings)
                .route_layer(require_session)
                .post(bookings::create_booking),
        )
        .route(
            "/bookings/:id",
            patch(bookings::update_booking_status).delete(bookings::delete_booking),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
