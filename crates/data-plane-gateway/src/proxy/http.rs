use super::redirect;
use crate::resolve::{Error, ResolvedShard};
use crate::{auth, SharedApp};
use bytes::Bytes;
use http::{header, Request, Response, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::sync::Arc;
use std::time::Duration;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub(crate) type ProxyBody = http_body_util::combinators::BoxBody<Bytes, BoxError>;

pub(crate) fn full_body(content: impl Into<Bytes>) -> ProxyBody {
    Full::new(content.into())
        .map_err(|never| match never {})
        .boxed()
}

fn incoming_body(body: Incoming) -> ProxyBody {
    body.map_err(|err| Box::new(err) as BoxError).boxed()
}

/// The single upstream of an HTTP proxy connection: a client connection
/// over the shard tunnel. It is never re-dialed; when it breaks, requests
/// fail with a 5xx + `Connection: close` and recovery happens through a
/// fresh client connection.
enum Upstream {
    Http1(hyper::client::conn::http1::SendRequest<ProxyBody>),
    Http2(hyper::client::conn::http2::SendRequest<ProxyBody>),
}

impl Upstream {
    async fn send(&mut self, req: Request<ProxyBody>) -> hyper::Result<Response<Incoming>> {
        match self {
            Upstream::Http1(sender) => {
                sender.ready().await?;
                sender.send_request(req).await
            }
            Upstream::Http2(sender) => {
                sender.ready().await?;
                sender.send_request(req).await
            }
        }
    }
}

#[derive(Clone)]
struct RequestContext {
    app: SharedApp,
    resolved: Arc<ResolvedShard>,
    upstream: Arc<tokio::sync::Mutex<Upstream>>,
    /// SNI of the proxied connection, used as the fallback request host.
    sni: String,
    use_http2_upstream: bool,
}

/// Serve the client's HTTP connection, reverse-proxying each authorized
/// request over the shard tunnel. `use_http2_client` reflects the negotiated
/// ALPN of the client connection.
pub async fn proxy_http<IO>(
    app: SharedApp,
    client: IO,
    tunnel: super::ProxyConnection,
    resolved: Arc<ResolvedShard>,
    use_http2_client: bool,
) -> Result<(), Error>
where
    IO: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    // The connector is assumed to speak http/1.1 unless its port is
    // explicitly configured to use only h2.
    let use_http2_upstream = resolved.port_protocol() == "h2";
    let sni = tunnel.hostname.clone();

    let io = TokioIo::new(tunnel);
    let upstream = if use_http2_upstream {
        let (sender, conn) = hyper::client::conn::http2::Builder::new(TokioExecutor::new())
            .handshake(io)
            .await
            .map_err(|err| Error::Io(std::io::Error::other(err)))?;
        tokio::spawn(async move {
            if let Err(err) = conn.await {
                tracing::debug!(error = %err, "upstream tunnel connection ended");
            }
        });
        Upstream::Http2(sender)
    } else {
        let (sender, conn) = hyper::client::conn::http1::Builder::new()
            .handshake(io)
            .await
            .map_err(|err| Error::Io(std::io::Error::other(err)))?;
        tokio::spawn(async move {
            if let Err(err) = conn.await {
                tracing::debug!(error = %err, "upstream tunnel connection ended");
            }
        });
        Upstream::Http1(sender)
    };

    let ctx = RequestContext {
        app,
        resolved,
        upstream: Arc::new(tokio::sync::Mutex::new(upstream)),
        sni,
        use_http2_upstream,
    };

    let service = hyper::service::service_fn(move |req: Request<Incoming>| {
        let ctx = ctx.clone();
        async move { Ok::<_, std::convert::Infallible>(handle_request(req, ctx).await) }
    });

    // These timeouts are reasonable starting points rather than carefully
    // tuned values. Better arbitrary timeouts than none at all.
    if use_http2_client {
        let mut builder = hyper::server::conn::http2::Builder::new(TokioExecutor::new());
        builder
            .timer(hyper_util::rt::TokioTimer::new())
            .keep_alive_interval(Duration::from_secs(10))
            .keep_alive_timeout(Duration::from_secs(20));
        builder
            .serve_connection(TokioIo::new(client), service)
            .await
            .map_err(|err| Error::Io(std::io::Error::other(err)))?;
    } else {
        let mut builder = hyper::server::conn::http1::Builder::new();
        builder
            .timer(hyper_util::rt::TokioTimer::new())
            .header_read_timeout(Duration::from_secs(20));
        builder
            .serve_connection(TokioIo::new(client), service)
            .await
            .map_err(|err| Error::Io(std::io::Error::other(err)))?;
    }
    Ok(())
}

async fn handle_request(req: Request<Incoming>, ctx: RequestContext) -> Response<ProxyBody> {
    let RequestContext {
        app,
        resolved,
        upstream,
        sni,
        use_http2_upstream,
    } = ctx;

    // If the port is private, then require that each request carries an
    // Authorization header or auth cookie which permits access to the task.
    // Headers of public ports are left alone, since they may be meant for
    // the connector itself.
    let is_public = resolved.port_is_public();
    if !is_public {
        let authorized = auth::authorized_http(req.headers(), &app.verification_key)
            .and_then(|claims| auth::enforce_prefix(&claims, &resolved.labeling.task_name));

        if let Err(err) = authorized {
            if accepts_html(req.headers()) {
                // Interactive sessions are routed through the dashboard to
                // pick up an auth cookie, landing back on /auth-redirect.
                if req.uri().path() == "/auth-redirect" {
                    return redirect::handle_auth_redirect(&req, &app);
                }
                return control_plane_redirect(&req, &app, &resolved.labeling.task_name, &sni);
            }
            return error_response(&Error::Auth(err), req.headers());
        }
    }

    let accept_headers = req.headers().clone();
    let mut req = req.map(incoming_body);
    if let Err(err) = direct_request(
        &mut req,
        &resolved.labeling.hostname,
        use_http2_upstream,
        is_public,
    ) {
        return error_response(&err, &accept_headers);
    }

    let result = {
        let mut upstream = upstream.lock().await;
        upstream.send(req).await
    };

    match result {
        Ok(resp) => {
            let mut resp = resp.map(incoming_body);
            if resp.status().as_u16() >= 500 {
                // Ask the client to drop this connection: the proxy cannot
                // re-establish a broken upstream, so recovery happens on a
                // fresh connection.
                resp.headers_mut()
                    .insert(header::CONNECTION, header::HeaderValue::from_static("close"));
            }
            resp
        }
        Err(err) => {
            tracing::error!(error = %err, sni, "proxy error");
            error_response(
                &Error::Io(std::io::Error::other(err)),
                &accept_headers,
            )
        }
    }
}

/// Rewrite an inbound request for forwarding to the connector container.
fn direct_request(
    req: &mut Request<ProxyBody>,
    task_hostname: &str,
    use_http2_upstream: bool,
    is_public: bool,
) -> Result<(), Error> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    if use_http2_upstream {
        *req.uri_mut() = Uri::builder()
            .scheme("https")
            .authority(task_hostname)
            .path_and_query(path_and_query)
            .build()
            .map_err(invalid_request)?;
    } else {
        // Origin-form URI with an explicit Host header.
        *req.uri_mut() = Uri::builder()
            .path_and_query(path_and_query)
            .build()
            .map_err(invalid_request)?;
        let host = header::HeaderValue::try_from(task_hostname).map_err(invalid_request)?;
        req.headers_mut().insert(header::HOST, host);
    }

    // Explicitly default User-Agent to empty, so the client library doesn't
    // substitute its own.
    if !req.headers().contains_key(header::USER_AGENT) {
        req.headers_mut()
            .insert(header::USER_AGENT, header::HeaderValue::from_static(""));
    }

    if !is_public {
        // The bearer token authorized the request to *this* proxy, and is
        // not forwarded to the container.
        req.headers_mut().remove(header::AUTHORIZATION);

        let cookies: Vec<String> = req
            .headers()
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(auth::strip_auth_cookie)
            .collect();

        req.headers_mut().remove(header::COOKIE);
        for cookie in cookies {
            if let Ok(value) = header::HeaderValue::try_from(cookie) {
                req.headers_mut().append(header::COOKIE, value);
            }
        }
    }

    Ok(())
}

fn invalid_request<E: Into<http::Error>>(err: E) -> Error {
    Error::InvalidRequest(err.into())
}

/// Redirect an interactive, unauthorized request to the control-plane
/// dashboard, which obtains a token and sends the user back through
/// /auth-redirect.
fn control_plane_redirect<B>(
    req: &Request<B>,
    app: &crate::App,
    task_name: &str,
    sni: &str,
) -> Response<ProxyBody> {
    let host = req
        .uri()
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| {
            req.headers()
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(|h| h.to_string())
        })
        .unwrap_or_else(|| sni.to_string());

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let orig_url = format!("https://{host}{path_and_query}");

    let mut location = app.control_plane_origin.clone();
    location.set_path("/data-plane-auth-req");
    location
        .query_pairs_mut()
        .append_pair("orig_url", &orig_url)
        .append_pair("prefix", task_name);

    Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(header::LOCATION, location.as_str())
        .body(full_body(Bytes::new()))
        .expect("building a redirect response cannot fail")
}

pub(crate) fn accepts_html(headers: &http::HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("html"))
}

/// Map an error to its client-facing HTTP status.
fn http_status(err: &Error) -> StatusCode {
    match err {
        Error::NoMatchingShard => StatusCode::NOT_FOUND,
        Error::Auth(auth::AuthError::InvalidToken) | Error::Auth(auth::AuthError::UnsupportedType) => {
            StatusCode::BAD_REQUEST
        }
        Error::Auth(auth::AuthError::MissingToken) => StatusCode::UNAUTHORIZED,
        // An authenticated user whose token simply doesn't authorize the
        // shard gets a 403 rather than 404: we can have a little more trust
        // in them, and be more helpful.
        Error::Auth(auth::AuthError::Unauthorized)
        | Error::Auth(auth::AuthError::NoAuthorizingLabels) => StatusCode::FORBIDDEN,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}

const ERROR_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
	<head>
	    <title>Error</title>
		<style>
			html {
				height: 100%;
				display: table;
				margin: auto;
			}
			body {
				height: 100%;
				display: table-cell;
				vertical-align: middle;
				background-color: white;
			}
		</style>
	</head>
	<body>
		<span style='font-size: 40px; color: black; font-family:Arial,Helvetica,sans-serif;'>@MESSAGE@</span>
	</body>
</html>"#;

pub(crate) fn render_html_error(message: &str) -> String {
    // Escape for embedding within the page's <span>.
    let message = message
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    ERROR_TEMPLATE.replace("@MESSAGE@", &message)
}

/// Render an error response, negotiating its body via the Accept header.
/// Error responses always carry `Connection: close`: the client drops the
/// connection and retries on a fresh one.
pub(crate) fn error_response(err: &Error, headers: &http::HeaderMap) -> Response<ProxyBody> {
    let status = http_status(err);
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let (body, content_type) = if accept.contains("json") {
        (
            serde_json::json!({ "error": err.to_string() }).to_string(),
            "application/json",
        )
    } else if accept.contains("html") {
        (render_html_error(&err.to_string()), "text/html")
    } else {
        (format!("Error: {err}"), "text/plain")
    };

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONNECTION, "close")
        .body(full_body(body))
        .expect("building an error response cannot fail")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::AuthError;

    #[test]
    fn test_http_status_mapping() {
        for (err, status) in [
            (Error::NoMatchingShard, 404),
            (Error::Auth(AuthError::InvalidToken), 400),
            (Error::Auth(AuthError::UnsupportedType), 400),
            (Error::Auth(AuthError::MissingToken), 401),
            (Error::Auth(AuthError::Unauthorized), 403),
            (Error::Auth(AuthError::NoAuthorizingLabels), 403),
            (Error::NoPrimaryShards, 503),
            (Error::PortNotPublic, 503),
        ] {
            assert_eq!(http_status(&err).as_u16(), status, "{err}");
        }
    }

    #[test]
    fn test_error_rendering_negotiates_content_type() {
        let err = Error::Auth(AuthError::MissingToken);

        let mut headers = http::HeaderMap::new();
        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        let resp = error_response(&err, &headers);
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(resp.headers()[header::CONNECTION], "close");

        headers.insert(header::ACCEPT, "text/html".parse().unwrap());
        let resp = error_response(&err, &headers);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/html");

        headers.remove(header::ACCEPT);
        let resp = error_response(&err, &headers);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_director_rewrites_and_strips_credentials() {
        let build = || {
            Request::builder()
                .method("GET")
                .uri("/api/x?q=1")
                .header(header::AUTHORIZATION, "Bearer tok")
                .header(
                    header::COOKIE,
                    format!("a=b; {}=tok; c=d", auth::AUTH_COOKIE_NAME),
                )
                .body(full_body(Bytes::new()))
                .unwrap()
        };

        // Private port: credentials are stripped, other cookies preserved.
        let mut req = build();
        direct_request(&mut req, "task1", false, false).unwrap();
        assert_eq!(req.uri(), "/api/x?q=1");
        assert_eq!(req.headers()[header::HOST], "task1");
        assert_eq!(req.headers()[header::USER_AGENT], "");
        assert!(!req.headers().contains_key(header::AUTHORIZATION));
        assert_eq!(req.headers()[header::COOKIE], "a=b; c=d");

        // Public port: headers pass through to the connector.
        let mut req = build();
        direct_request(&mut req, "task1", false, true).unwrap();
        assert!(req.headers().contains_key(header::AUTHORIZATION));
        assert_eq!(
            req.headers()[header::COOKIE],
            format!("a=b; {}=tok; c=d", auth::AUTH_COOKIE_NAME),
        );

        // An h2 upstream gets an absolute https URI.
        let mut req = build();
        direct_request(&mut req, "task1", true, true).unwrap();
        assert_eq!(req.uri(), "https://task1/api/x?q=1");
    }

    #[test]
    fn test_user_agent_is_preserved_when_present() {
        let mut req = Request::builder()
            .uri("/")
            .header(header::USER_AGENT, "curl/8.0")
            .body(full_body(Bytes::new()))
            .unwrap();
        direct_request(&mut req, "task1", false, true).unwrap();
        assert_eq!(req.headers()[header::USER_AGENT], "curl/8.0");
    }

    #[test]
    fn test_control_plane_redirect_location() {
        let app = crate::test_app("gw.example");

        let req = Request::builder()
            .uri("/dashboard")
            .header(header::HOST, "task1-8080.gw.example")
            .header(header::ACCEPT, "text/html")
            .body(())
            .unwrap();

        let resp = control_plane_redirect(&req, &app, "acme/task/one", "task1-8080.gw.example");
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers()[header::LOCATION],
            "https://dashboard.example/data-plane-auth-req?orig_url=https%3A%2F%2Ftask1-8080.gw.example%2Fdashboard&prefix=acme%2Ftask%2Fone",
        );
    }

    #[test]
    fn test_html_error_page_escapes_message() {
        let page = render_html_error("bad <thing> & worse");
        assert!(page.contains("bad &lt;thing&gt; &amp; worse"));
        assert!(!page.contains("<thing>"));
    }
}
