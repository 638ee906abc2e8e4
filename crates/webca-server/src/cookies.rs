//! Cookie access over HTTP header maps.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, SET_COOKIE},
};
use tracing::warn;
use webca_session::{CookieError, RequestCookies, ResponseCookies, SessionCookie, find_cookie};

/// Request-side view of a header map.
///
/// Every `Cookie` header is searched in order; attached cookies are appended
/// as a new `Cookie` header.
pub struct RequestHeaders<'a>(pub &'a mut HeaderMap);

impl RequestCookies for RequestHeaders<'_> {
    fn cookie(&self, name: &str) -> Result<Option<String>, CookieError> {
        for value in self.0.get_all(COOKIE) {
            let header = value.to_str().map_err(|_| CookieError::InvalidHeader)?;
            if let Some(found) = find_cookie(header, name)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn attach(&mut self, cookie: &SessionCookie) {
        match HeaderValue::from_str(&cookie.to_pair()) {
            Ok(value) => {
                self.0.append(COOKIE, value);
            }
            Err(e) => warn!(cookie = %cookie.name, error = %e, "Cannot attach cookie to request"),
        }
    }
}

/// Response-side view of a header map.
pub struct ResponseHeaders<'a>(pub &'a mut HeaderMap);

impl ResponseCookies for ResponseHeaders<'_> {
    fn set_cookie(&mut self, cookie: &SessionCookie) {
        match HeaderValue::from_str(&cookie.to_set_cookie()) {
            Ok(value) => {
                self.0.append(SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = %cookie.name, error = %e, "Cannot set cookie on response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("goSessionId=abc"));

        let request = RequestHeaders(&mut headers);
        assert_eq!(
            request.cookie("goSessionId").unwrap(),
            Some("abc".to_string())
        );
        assert_eq!(request.cookie("missing").unwrap(), None);
    }

    #[test]
    fn test_non_ascii_header_is_invalid() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_bytes(b"goSessionId=\xff").unwrap());

        let request = RequestHeaders(&mut headers);
        assert_eq!(
            request.cookie("goSessionId"),
            Err(CookieError::InvalidHeader)
        );
    }

    #[test]
    fn test_attach_is_visible_to_later_reads() {
        let mut headers = HeaderMap::new();
        let mut request = RequestHeaders(&mut headers);
        request.attach(&SessionCookie::issue("goSessionId", "abc"));

        assert_eq!(
            request.cookie("goSessionId").unwrap(),
            Some("abc".to_string())
        );
        assert_eq!(headers.get(COOKIE).unwrap(), "goSessionId=abc");
    }

    #[test]
    fn test_set_cookie_appends() {
        let mut headers = HeaderMap::new();
        let mut response = ResponseHeaders(&mut headers);
        response.set_cookie(&SessionCookie::issue("goSessionId", "abc"));
        response.set_cookie(&SessionCookie::expire("goSessionId", "abc"));

        let values: Vec<_> = headers.get_all(SET_COOKIE).iter().collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], "goSessionId=abc; Path=/");
        assert_eq!(values[1], "goSessionId=abc; Path=/; Max-Age=0");
    }
}
