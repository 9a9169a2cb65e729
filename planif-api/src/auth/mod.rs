//! Cookie-based sessions on top of the hosted auth provider.

mod extractor;
mod guard;
mod router;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::domain::AuthSession;

pub use extractor::CurrentUser;
pub use guard::require_user;
pub use router::{account_router, router};

pub const ACCESS_COOKIE: &str = "sb-access-token";
pub const REFRESH_COOKIE: &str = "sb-refresh-token";

const REFRESH_COOKIE_DAYS: i64 = 30;

fn session_cookie(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .secure(secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Stores both tokens of `session` as http-only cookies.
pub(crate) fn store_session(jar: CookieJar, session: &AuthSession, secure: bool) -> CookieJar {
    let access_age = Duration::seconds(session.expires_in.unwrap_or(3600));
    jar.add(session_cookie(
        ACCESS_COOKIE,
        session.access_token.clone(),
        access_age,
        secure,
    ))
    .add(session_cookie(
        REFRESH_COOKIE,
        session.refresh_token.clone(),
        Duration::days(REFRESH_COOKIE_DAYS),
        secure,
    ))
}

pub(crate) fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

pub(crate) fn access_token(jar: &CookieJar) -> Option<String> {
    jar.get(ACCESS_COOKIE).map(|c| c.value().to_string())
}

pub(crate) fn refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE).map(|c| c.value().to_string())
}
