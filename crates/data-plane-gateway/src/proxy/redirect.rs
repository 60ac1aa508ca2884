//! The `/auth-redirect` endpoint of the HTTP proxy, used in the
//! authentication flow for private ports. After a user acquires an auth
//! token from the dashboard, they're sent back here with `token` and
//! `orig_url` parameters; the token is set as an origin-scoped cookie and
//! the user is redirected on to where they started.

use super::http::{full_body, render_html_error, ProxyBody};
use crate::auth::AUTH_COOKIE_NAME;
use http::{header, Request, Response, StatusCode};

pub fn handle_auth_redirect<B>(req: &Request<B>, app: &crate::App) -> Response<ProxyBody> {
    let mut token = None;
    let mut orig_url = None;

    for (name, value) in url::form_urlencoded::parse(req.uri().query().unwrap_or("").as_bytes()) {
        match name.as_ref() {
            "token" => token = Some(value.into_owned()),
            "orig_url" => orig_url = Some(value.into_owned()),
            _ => {}
        }
    }

    // The token is not validated here. If it's invalid, we'll catch it when
    // the browser requests the new location, and can handle it then.
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return auth_error_response("url is missing the token parameter");
    };
    let Some(orig_url) = orig_url.filter(|u| !u.is_empty()) else {
        return auth_error_response("url is missing the orig_url parameter");
    };

    let parsed = match url::Url::parse(&orig_url) {
        Ok(parsed) => parsed,
        Err(err) => {
            return auth_error_response(&format!("invalid orig_url parameter: {err}"));
        }
    };

    // Check that the original URL is actually a subdomain of the gateway.
    // This isn't required for security, since the cookie is scoped to a
    // single origin, but it fails fast on a mis-constructed redirect.
    let suffix = app.proxy_domain_suffix();
    if !parsed
        .host_str()
        .is_some_and(|host| host.ends_with(&suffix))
    {
        return auth_error_response(&format!(
            "invalid orig_url parameter: hostname '{}' is not a subdomain of {}",
            parsed.host_str().unwrap_or(""),
            suffix,
        ));
    }

    let cookie = format!("{AUTH_COOKIE_NAME}={token}; Secure; HttpOnly");
    let (Ok(cookie), Ok(location)) = (
        header::HeaderValue::try_from(cookie),
        header::HeaderValue::try_from(orig_url),
    ) else {
        return auth_error_response("invalid token or orig_url parameter");
    };

    Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(header::SET_COOKIE, cookie)
        .header(header::LOCATION, location)
        .body(full_body(bytes::Bytes::new()))
        .expect("building a redirect response cannot fail")
}

// Render an HTML error page with a 400 status. These are not redirected back
// to the dashboard, which would loop indefinitely, and are always HTML since
// this endpoint is only reached by interactive sessions.
fn auth_error_response(message: &str) -> Response<ProxyBody> {
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header(header::CONTENT_TYPE, "text/html")
        .body(full_body(render_html_error(message)))
        .expect("building an error response cannot fail")
}

#[cfg(test)]
mod test {
    use super::*;

    fn request(query: &str) -> Request<()> {
        Request::builder()
            .uri(format!("/auth-redirect?{query}"))
            .body(())
            .unwrap()
    }

    #[test]
    fn test_successful_redirect_sets_cookie() {
        let app = crate::test_app("gw.example");
        let resp = handle_auth_redirect(
            &request("token=tok.en.123&orig_url=https%3A%2F%2Ftask1-8080.gw.example%2Fdashboard"),
            &app,
        );

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers()[header::SET_COOKIE],
            format!("{AUTH_COOKIE_NAME}=tok.en.123; Secure; HttpOnly"),
        );
        assert_eq!(
            resp.headers()[header::LOCATION],
            "https://task1-8080.gw.example/dashboard",
        );
    }

    #[test]
    fn test_missing_parameters_render_an_error_page() {
        let app = crate::test_app("gw.example");

        for query in [
            "",
            "token=tok",
            "orig_url=https%3A%2F%2Ftask1-8080.gw.example%2F",
            "token=&orig_url=https%3A%2F%2Ftask1-8080.gw.example%2F",
        ] {
            let resp = handle_auth_redirect(&request(query), &app);
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "query {query:?}");
            assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/html");
            assert!(!resp.headers().contains_key(header::SET_COOKIE));
        }
    }

    #[test]
    fn test_orig_url_must_be_a_gateway_subdomain() {
        let app = crate::test_app("gw.example");
        let resp = handle_auth_redirect(
            &request("token=tok&orig_url=https%3A%2F%2Fevil.example%2Fsteal"),
            &app,
        );
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!resp.headers().contains_key(header::SET_COOKIE));
    }

    #[test]
    fn test_malformed_orig_url_is_rejected() {
        let app = crate::test_app("gw.example");
        let resp = handle_auth_redirect(&request("token=tok&orig_url=not-a-url"), &app);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
