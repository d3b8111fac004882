//! Log-out route handler that invalidates the auth cookie.

use axum::http::StatusCode;
use axum_extra::extract::PrivateCookieJar;

use crate::auth::cookie::invalidate_auth_cookie;

/// Invalidate the auth cookie.
pub async fn get_log_out(jar: PrivateCookieJar) -> (PrivateCookieJar, StatusCode) {
    (invalidate_auth_cookie(jar), StatusCode::NO_CONTENT)
}
