//! Per-request protocol demultiplexing of base-domain connections.
//!
//! A single connection may carry both gRPC and REST requests over its
//! lifetime (intermediaries keep HTTP/2 connections alive across mixed
//! usage), so the split is made per-request rather than per-connection:
//! HTTP/2 requests whose content-type is `application/grpc*` are routed to
//! the gRPC services, and everything else to the REST mux.

use futures::future::BoxFuture;
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::convert::Infallible;
use std::task::{Context, Poll};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct Demux {
    grpc: axum::Router,
    rest: axum::Router,
}

impl Demux {
    pub fn new(grpc: axum::Router, rest: axum::Router) -> Self {
        Self { grpc, rest }
    }
}

fn is_grpc_request<B>(req: &http::Request<B>) -> bool {
    req.version() == http::Version::HTTP_2
        && req
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/grpc"))
}

impl tower::Service<http::Request<hyper::body::Incoming>> for Demux {
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<hyper::body::Incoming>) -> Self::Future {
        use tower::ServiceExt;

        let router = if is_grpc_request(&req) {
            self.grpc.clone()
        } else {
            self.rest.clone()
        };
        let req = req.map(axum::body::Body::new);

        Box::pin(async move { router.oneshot(req).await })
    }
}

/// Serve a single accepted connection with the demux service.
/// The auto builder negotiates HTTP/1.1 vs HTTP/2 from the wire (including
/// h2c prior knowledge on plain connections).
pub async fn serve_connection<IO>(io: IO, demux: Demux)
where
    IO: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let builder = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new());
    if let Err(err) = builder
        .serve_connection_with_upgrades(
            TokioIo::new(io),
            hyper_util::service::TowerToHyperService::new(demux),
        )
        .await
    {
        tracing::debug!(error = %err, "base connection ended with error");
    }
}

/// Serve TLS connections which the front door classified as base-domain
/// traffic, until the front door closes the channel or we're cancelled.
pub async fn serve_overflow(
    mut overflow_rx: tokio::sync::mpsc::Receiver<
        tokio_rustls::server::TlsStream<tokio::net::TcpStream>,
    >,
    demux: Demux,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            conn = overflow_rx.recv() => match conn {
                Some(conn) => {
                    spawn_connection(serve_connection(conn, demux.clone()), cancel.clone());
                }
                None => return Ok(()),
            },
            _ = cancel.cancelled() => return Ok(()),
        }
    }
}

// Serve a connection until it completes or the process is stopping;
// cancellation drops the in-flight connection.
fn spawn_connection(
    conn: impl std::future::Future<Output = ()> + Send + 'static,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        tokio::select! {
            () = conn => {}
            _ = cancel.cancelled() => {}
        }
    });
}

/// Serve the plain-HTTP listener: REST, health, and (via h2c) local
/// development gRPC without TLS.
pub async fn serve_plain(
    listener: tokio::net::TcpListener,
    demux: Demux,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    use anyhow::Context as _;

    loop {
        tokio::select! {
            accept = listener.accept() => {
                let (socket, _addr) = accept.context("failed to accept plain connection")?;
                spawn_connection(serve_connection(socket, demux.clone()), cancel.clone());
            }
            _ = cancel.cancelled() => return Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_grpc_request_classification() {
        let request = |version, content_type: Option<&str>| {
            let mut builder = http::Request::builder().version(version).uri("/");
            if let Some(ct) = content_type {
                builder = builder.header(http::header::CONTENT_TYPE, ct);
            }
            builder.body(()).unwrap()
        };

        assert!(is_grpc_request(&request(
            http::Version::HTTP_2,
            Some("application/grpc")
        )));
        assert!(is_grpc_request(&request(
            http::Version::HTTP_2,
            Some("application/grpc+proto")
        )));

        // Wrong version, or a REST content type, routes to the REST mux.
        assert!(!is_grpc_request(&request(
            http::Version::HTTP_11,
            Some("application/grpc")
        )));
        assert!(!is_grpc_request(&request(
            http::Version::HTTP_2,
            Some("application/json")
        )));
        assert!(!is_grpc_request(&request(http::Version::HTTP_2, None)));
    }
}
