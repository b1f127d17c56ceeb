use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use super::handlers::TOKEN_COOKIE;
use crate::shared::{AppError, AppState};

/// Session cookie authentication middleware - verifies the `token` cookie and adds SessionClaims to request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), session::require_session))
/// Handlers can then extract Extension(claims): Extension<SessionClaims>.
#[instrument(skip(state, req, next))]
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(req.headers());

    // A cleared cookie arrives with an empty value and counts as absent
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            warn!(uri = %req.uri(), "Missing session cookie");
            AppError::Unauthorized
        })?;

    let claims = state.tokens.verify(token).map_err(|e| {
        warn!(uri = %req.uri(), error = %e, "Session token rejected");
        AppError::from(e)
    })?;

    info!(
        email = claims.identity.email().unwrap_or_default(),
        "Authentication successful, adding claims to request"
    );

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
