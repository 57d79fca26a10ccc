use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

/// Session id carried by a verified cookie. Tampered or malformed values read as absent.
pub fn session_id(jar: &SignedCookieJar) -> Option<String> {
    let cookie = jar.get(SESSION_COOKIE)?;
    Uuid::parse_str(cookie.value()).ok().map(|id| id.to_string())
}

pub fn with_session(jar: SignedCookieJar, session_id: &str) -> SignedCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, session_id.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Key;

    #[test]
    fn issued_cookie_reads_back() {
        let jar = SignedCookieJar::new(Key::generate());
        let id = Uuid::new_v4().to_string();

        let jar = with_session(jar, &id);

        assert_eq!(session_id(&jar), Some(id));
    }

    #[test]
    fn non_uuid_value_is_ignored() {
        let jar = SignedCookieJar::new(Key::generate());
        let jar = jar.add(Cookie::new(SESSION_COOKIE, "not-a-uuid"));

        assert_eq!(session_id(&jar), None);
    }
}
