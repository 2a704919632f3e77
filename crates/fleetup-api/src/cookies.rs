//! Cookie parsing and building
//!
//! Session and impersonation state travel in HTTP-only cookies. Parsing
//! works directly on the `Cookie` header; building produces `Set-Cookie`
//! values with the attributes required for both: HTTP-only, `SameSite=Lax`,
//! and `Secure` when the deployment is served over TLS.

use axum::http::{header, HeaderMap};

/// Name of the session token cookie.
pub const SESSION_COOKIE: &str = "session_token";
/// Name of the impersonation token cookie.
pub const IMPERSONATION_COOKIE: &str = "impersonation_token";

/// Extract a cookie value from the request headers.
pub fn get<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;

    cookie_header
        .split(';')
        .map(|c| c.trim())
        .find_map(|c| c.strip_prefix(name)?.strip_prefix('='))
}

/// Build a `Set-Cookie` value carrying `value` for `max_age_secs`.
pub fn build(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build a `Set-Cookie` value that clears the named cookie.
pub fn clear(name: &str, secure: bool) -> String {
    build(name, "", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_get_finds_cookie_among_many() {
        let headers = headers_with_cookie("theme=dark; session_token=abc.def.ghi; lang=en");

        assert_eq!(get(&headers, SESSION_COOKIE), Some("abc.def.ghi"));
        assert_eq!(get(&headers, "lang"), Some("en"));
        assert_eq!(get(&headers, IMPERSONATION_COOKIE), None);
    }

    #[test]
    fn test_get_does_not_match_prefixes() {
        // `session_token_old` must not satisfy a lookup for
        // `session_token`
        let headers = headers_with_cookie("session_token_old=stale");

        assert_eq!(get(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn test_get_without_cookie_header() {
        assert_eq!(get(&HeaderMap::new(), SESSION_COOKIE), None);
    }

    #[test]
    fn test_build_sets_required_attributes() {
        let cookie = build(SESSION_COOKIE, "tok", 3600, false);

        assert!(cookie.starts_with("session_token=tok;"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_build_secure_in_production() {
        let cookie = build(IMPERSONATION_COOKIE, "tok", 14400, true);

        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_expires_immediately() {
        let cookie = clear(IMPERSONATION_COOKIE, false);

        assert!(cookie.starts_with("impersonation_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
