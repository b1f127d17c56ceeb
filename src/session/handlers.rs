use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, instrument};

use super::types::{IdentityClaims, SuccessResponse};
use crate::shared::{AppError, AppState, ValidatedJson};

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// Session cookie: HttpOnly, Secure and sent on cross-site requests
fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .build()
}

/// HTTP handler for issuing a session token
///
/// POST /jwt
/// Signs the posted identity and stores the token in the `token` cookie
#[instrument(name = "issue_token", skip(state, jar, identity))]
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(identity): ValidatedJson<IdentityClaims>,
) -> Result<(CookieJar, Json<SuccessResponse>), AppError> {
    let email = identity.email().unwrap_or_default().to_string();
    let token = state.tokens.issue(identity)?;

    info!(%email, "Session token issued");

    Ok((jar.add(session_cookie(token)), Json(SuccessResponse::ok())))
}

/// HTTP handler for logging out
///
/// POST /logout
/// Always sends a removal cookie, whether or not the request carried one
#[instrument(name = "logout", skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    let had_session = jar.get(TOKEN_COOKIE).is_some();

    let mut removal = session_cookie(String::new());
    removal.make_removal();

    info!(had_session, "Logging out, clearing session cookie");

    (jar.add(removal), Json(SuccessResponse::ok()))
}
