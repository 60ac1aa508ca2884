//! The shard-proxy data plane: per-connection dispatch of TLS connections to
//! a streaming RPC against the shard's primary reactor.

use crate::resolve::{Error, ResolvedShard, Resolver};
use crate::SharedApp;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::server::TlsStream;

pub mod connection;
pub use connection::ProxyConnection;

mod http;
mod redirect;
mod tcp;

mod server;
pub use server::ProxyServer;

/// Is the negotiated ALPN protocol one the HTTP reverse proxy handles?
fn is_http(negotiated: Option<&[u8]>) -> bool {
    matches!(negotiated, Some(b"h2") | Some(b"http/1.1"))
}

/// Handle an accepted TLS connection whose SNI classified it as a proxy
/// subdomain. Never returns an error: failures are logged and counted here.
pub async fn handle_proxy_connection(
    app: SharedApp,
    resolver: Arc<Resolver>,
    mut conn: TlsStream<TcpStream>,
    sni: String,
    client_addr: std::net::SocketAddr,
) {
    use tokio::io::AsyncWriteExt;

    let client_addr = client_addr.to_string();
    let negotiated = conn
        .get_ref()
        .1
        .alpn_protocol()
        .map(|proto| proto.to_vec());

    // Resolution here is the second phase: the ClientHello callback already
    // resolved this SNI and (absent heavy eviction) primed the cache.
    let resolved = match resolver.resolve(&sni, &client_addr).await {
        Ok(resolved) => resolved,
        Err(err) => {
            tracing::warn!(error = %err, sni, client_addr, "rejecting connection");
            metrics::counter!("net_proxy_conns_reject_total").increment(1);
            let _ = conn.shutdown().await;
            return;
        }
    };

    // If the protocol is HTTP then the port may be public or private, since
    // the HTTP proxy enforces per-request authorization. Any other protocol
    // requires that the port is public.
    if !is_http(negotiated.as_deref()) && !resolved.port_is_public() {
        tracing::warn!(
            error = %Error::PortNotPublic,
            sni,
            client_addr,
            proto = ?negotiated,
            "rejecting connection"
        );
        metrics::counter!("net_proxy_conns_reject_total").increment(1);
        let _ = conn.shutdown().await;
        return;
    }

    let (shard, port) = (resolved.shard_id.clone(), resolved.target_port.to_string());
    metrics::counter!("net_proxy_conns_accept_total", "shard" => shard.clone(), "port" => port.clone())
        .increment(1);

    match proxy_connection(app, conn, &sni, &client_addr, resolved, negotiated).await {
        Ok(()) => {
            metrics::counter!("net_proxy_conns_closed_total", "shard" => shard, "port" => port, "status" => "ok")
                .increment(1);
            tracing::info!(sni, client_addr, "finished proxy connection");
        }
        Err(err) => {
            metrics::counter!("net_proxy_conns_closed_total", "shard" => shard, "port" => port, "status" => "error")
                .increment(1);
            tracing::warn!(error = %err, sni, client_addr, "failed to proxy connection");
        }
    }
}

async fn proxy_connection(
    app: SharedApp,
    conn: TlsStream<TcpStream>,
    sni: &str,
    client_addr: &str,
    resolved: Arc<ResolvedShard>,
    negotiated: Option<Vec<u8>>,
) -> Result<(), Error> {
    let tunnel = connection::open(&resolved, sni, client_addr).await?;

    tracing::debug!(sni, client_addr, proto = ?negotiated, "starting to proxy connection data");

    if is_http(negotiated.as_deref()) {
        let use_http2 = negotiated.as_deref() == Some(b"h2");
        http::proxy_http(app, conn, tunnel, resolved, use_http2).await
    } else {
        tcp::proxy_tcp(conn, tunnel).await
    }
}
