pub mod callback;
pub use self::callback::callback;

pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

pub mod logout;
pub use self::logout::logout;

pub mod profile;
pub use self::profile::profile;

pub mod root;
pub use self::root::root;

// common functions for the handlers
use axum::{
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use tracing::error;

/// `302 Found` to `location`, optionally setting a cookie.
///
/// `axum::response::Redirect` only offers 303/307/308.
pub(crate) fn found(location: &str, set_cookie: Option<HeaderValue>) -> Response {
    let Ok(location) = HeaderValue::from_str(location) else {
        error!("Refusing to redirect to an invalid Location header");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location);
    if let Some(cookie) = set_cookie {
        headers.insert(SET_COOKIE, cookie);
    }

    (StatusCode::FOUND, headers).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_sets_location_and_cookie() {
        let response = found("/profile", Some(HeaderValue::from_static("a=b")));
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/profile")
        );
        assert_eq!(
            response.headers().get(SET_COOKIE).and_then(|v| v.to_str().ok()),
            Some("a=b")
        );
    }

    #[test]
    fn found_rejects_header_injection() {
        let response = found("/ok\r\nSet-Cookie: x=y", None);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
