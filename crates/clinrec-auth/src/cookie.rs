//! Session cookie construction.
//!
//! The session token travels as an opaque cookie value. The cookie is
//! script-inaccessible (HttpOnly), restricted to same-site requests, and
//! carries a Max-Age equal to the idle timeout. HTTP transport itself is
//! an external collaborator concern.

use std::time::Duration;

use cookie::{Cookie, SameSite};

use crate::session::Session;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "clinrec_session";

/// Builds the session cookie for a freshly issued session.
#[must_use]
pub fn session_cookie(session: &Session, idle_timeout: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session.token.clone()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(cookie::time::Duration::seconds(
            i64::try_from(idle_timeout.as_secs()).unwrap_or(i64::MAX),
        ))
        .build()
}

/// Builds the removal cookie sent on logout.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .build();
    cookie.make_removal();
    cookie
}
