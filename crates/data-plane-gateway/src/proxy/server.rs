use crate::resolve::Resolver;
use crate::SharedApp;
use anyhow::Context;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::server::TlsStream;
use tokio_rustls::LazyConfigAcceptor;
use tokio_util::sync::CancellationToken;

/// ProxyServer is the TLS front door: a single TCP+TLS listener whose
/// per-connection behavior is driven by the client's SNI.
///
/// SNIs which are proper subdomains of the gateway hostname resolve (during
/// the handshake) to a task shard, whose port configuration selects the ALPN
/// protocols offered in the server hello; these connections are then proxied
/// to the shard's primary reactor. All other connections complete the
/// handshake against the base configuration and are handed to the overflow
/// channel, where a conventional HTTP server picks them up.
pub struct ProxyServer {
    app: SharedApp,
    resolver: Arc<Resolver>,
    listener: TcpListener,
    overflow_tx: tokio::sync::mpsc::Sender<TlsStream<TcpStream>>,
    base_config: Arc<rustls::ServerConfig>,
    cert_resolver: Arc<dyn rustls::server::ResolvesServerCert>,
    cancel: CancellationToken,
}

// The same wildcard certificate is offered for every connection.
#[derive(Debug)]
struct SingleCertResolver(Arc<rustls::sign::CertifiedKey>);

impl rustls::server::ResolvesServerCert for SingleCertResolver {
    fn resolve(
        &self,
        _hello: rustls::server::ClientHello,
    ) -> Option<Arc<rustls::sign::CertifiedKey>> {
        Some(self.0.clone())
    }
}

impl ProxyServer {
    /// Bind the TLS listener, returning the server and the receiver of
    /// overflow (non-proxied) connections.
    pub async fn bind(
        port: u16,
        certs: Vec<CertificateDer<'static>>,
        key: PrivateKeyDer<'static>,
        app: SharedApp,
        resolver: Arc<Resolver>,
        cancel: CancellationToken,
    ) -> anyhow::Result<(Self, tokio::sync::mpsc::Receiver<TlsStream<TcpStream>>)> {
        let listener = TcpListener::bind(format!("[::]:{port}"))
            .await
            .context("failed to bind TLS server port")?;

        let signing_key = rustls::crypto::aws_lc_rs::sign::any_supported_type(&key)
            .map_err(|err| anyhow::anyhow!("parsing TLS private key: {err}"))?;
        let cert_resolver: Arc<dyn rustls::server::ResolvesServerCert> = Arc::new(
            SingleCertResolver(Arc::new(rustls::sign::CertifiedKey::new(certs, signing_key))),
        );

        let mut base_config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_cert_resolver(cert_resolver.clone());
        // HTTP2 support must be advertised explicitly for non-proxied
        // connections, or it won't be offered.
        base_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

        let (overflow_tx, overflow_rx) = tokio::sync::mpsc::channel(16);

        Ok((
            Self {
                app,
                resolver,
                listener,
                overflow_tx,
                base_config: Arc::new(base_config),
                cert_resolver,
                cancel,
            },
            overflow_rx,
        ))
    }

    /// Accept and dispatch connections until cancelled.
    /// Listener-level errors are fatal.
    pub async fn serve(self) -> anyhow::Result<()> {
        loop {
            tokio::select! {
                accept = self.listener.accept() => {
                    let (socket, addr) = accept.context("failed to accept tls connection")?;

                    // Handle each connection on its own task, so the
                    // handshake (and its shard resolution) doesn't block the
                    // accept loop. Cancellation propagates by dropping the
                    // in-flight connection future.
                    let conn = handle_connection(
                        self.app.clone(),
                        self.resolver.clone(),
                        self.overflow_tx.clone(),
                        self.base_config.clone(),
                        self.cert_resolver.clone(),
                        socket,
                        addr,
                    );
                    let cancel = self.cancel.clone();
                    tokio::spawn(async move {
                        tokio::select! {
                            () = conn => {}
                            _ = cancel.cancelled() => {}
                        }
                    });
                }
                _ = self.cancel.cancelled() => {
                    tracing::info!("proxy server shutting down");
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_connection(
    app: SharedApp,
    resolver: Arc<Resolver>,
    overflow_tx: tokio::sync::mpsc::Sender<TlsStream<TcpStream>>,
    base_config: Arc<rustls::ServerConfig>,
    cert_resolver: Arc<dyn rustls::server::ResolvesServerCert>,
    socket: TcpStream,
    addr: std::net::SocketAddr,
) {
    let start = match LazyConfigAcceptor::new(rustls::server::Acceptor::default(), socket).await {
        Ok(start) => start,
        Err(err) => {
            tracing::warn!(error = %err, client_addr = %addr, "tls handshake error");
            return;
        }
    };

    let (sni, client_protos) = {
        let hello = start.client_hello();
        (
            hello.server_name().unwrap_or_default().to_string(),
            hello
                .alpn()
                .map(|protos| protos.map(|p| p.to_vec()).collect::<Vec<_>>())
                .unwrap_or_default(),
        )
    };
    tracing::debug!(
        sni,
        client_addr = %addr,
        client_protos = ?client_protos.iter().map(|p| String::from_utf8_lossy(p).into_owned()).collect::<Vec<_>>(),
        "got tls client hello"
    );

    // Select this connection's TLS configuration based on its SNI.
    // Proxy subdomains resolve their shard *now*, because the shard's port
    // configuration determines which ALPN protocols to offer.
    let config = if app.is_proxy_subdomain(&sni) {
        match resolver.resolve(&sni, &addr.to_string()).await {
            Ok(resolved) => {
                if resolved.port_protocol().is_empty() && client_protos.len() > 1 {
                    // The port doesn't specify a protocol and the client
                    // offered several, so the negotiated protocol may not
                    // match what the container expects. Let the connection
                    // proceed; the container's own protocol errors are at
                    // least visible to the user, where these logs are not.
                    tracing::warn!(
                        sni,
                        client_addr = %addr,
                        "client ALPN supports multiple protocols, but the port configuration does not specify one"
                    );
                }
                proxy_config(&cert_resolver, resolved.alpn_protocols(&client_protos))
            }
            Err(err) => {
                tracing::warn!(error = %err, sni, client_addr = %addr, "error resolving sni to shard");
                metrics::counter!("net_proxy_conns_reject_total").increment(1);
                return; // Fail the handshake by dropping the connection.
            }
        }
    } else {
        // Any SNI is accepted for connections that aren't proxied to
        // containers.
        base_config
    };

    // Complete the handshake explicitly, so that the negotiated protocol
    // and SNI are fixed before routing.
    let tls = match start.into_stream(config).await {
        Ok(tls) => tls,
        Err(err) => {
            tracing::warn!(error = %err, sni, client_addr = %addr, "tls handshake error");
            return;
        }
    };

    if app.is_proxy_subdomain(&sni) {
        tracing::debug!(sni, client_addr = %addr, "handling connection as a proxy");
        super::handle_proxy_connection(app, resolver, tls, sni, addr).await;
    } else {
        tracing::debug!(sni, client_addr = %addr, "sending connection to overflow listener");
        // If the overflow side has shut down, the connection is dropped.
        let _ = overflow_tx.send(tls).await;
    }
}

fn proxy_config(
    cert_resolver: &Arc<dyn rustls::server::ResolvesServerCert>,
    alpn_protocols: Vec<Vec<u8>>,
) -> Arc<rustls::ServerConfig> {
    let mut config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_cert_resolver(cert_resolver.clone());
    config.alpn_protocols = alpn_protocols;

    // Session tickets and resumption state are tied to each individual
    // config, and these configs live for a single handshake. Resumption
    // across them would require managing ticket keys ourselves, so it's
    // disabled for proxied connections.
    config.session_storage = Arc::new(rustls::server::NoServerSessionStorage {});
    config.send_tls13_tickets = 0;

    Arc::new(config)
}
