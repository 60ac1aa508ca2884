use anyhow::{bail, Context};
use clap::Parser;
use data_plane_gateway::{
    demux, grpc, logging, metrics_server, ops, proxy, resolve, rest, App,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An authorizing, TLS-terminating proxy in front of a Flow data plane:
/// its brokers, consumers, and the network ports of running tasks.
#[derive(Debug, Parser)]
#[command(about, version)]
pub struct Cli {
    /// Target broker address, as host:port or unix:///path/to/socket.
    #[arg(long = "broker-address", env = "BROKER_ADDRESS", default_value = "http://localhost:8080")]
    broker_address: String,
    /// Target consumer address, as host:port or unix:///path/to/socket.
    #[arg(long = "consumer-address", env = "CONSUMER_ADDRESS", default_value = "http://localhost:9000")]
    consumer_address: String,
    /// Target schema-inference service address.
    #[arg(long = "inference-address", env = "INFERENCE_ADDRESS", default_value = "http://localhost:9090")]
    inference_address: String,
    /// CORS origin(s) of the REST API, as a comma-separated list of regexes.
    /// '*' admits any origin.
    #[arg(long = "cors-origin", env = "CORS_ORIGIN", default_value = "*")]
    cors_origin: String,
    /// Key used to verify JWTs signed by the Flow control plane.
    #[arg(long = "verification-key", env = "VERIFICATION_KEY", default_value = "supersecret")]
    verification_key: String,
    /// Base hostname of the gateway. Subdomains of this hostname are proxied
    /// to the network ports of matching task shards.
    #[arg(long, env = "GATEWAY_HOSTNAME", default_value = "localhost")]
    hostname: String,
    /// Origin of the control-plane dashboard, used to acquire auth cookies
    /// for interactive sessions.
    #[arg(long = "control-plane-origin", env = "CONTROL_PLANE_ORIGIN", default_value = "https://dashboard.estuary.dev")]
    control_plane_origin: url::Url,
    /// Service port for plain HTTP requests (REST, health, and h2c gRPC for
    /// local development).
    #[arg(long = "plain-port", env = "PLAIN_PORT", default_value = "28317")]
    plain_port: u16,
    /// Service port for TLS connections: HTTPS, gRPC, and task-port
    /// proxying.
    #[arg(long, env = "PORT", default_value = "28318")]
    port: u16,
    /// Internal-only port for metrics and health.
    #[arg(long = "debug-port", env = "DEBUG_PORT", default_value = "28316")]
    debug_port: u16,
    /// Path of the PEM certificate (chain) served for all TLS connections.
    /// It's assumed to be a wildcard certificate for `*.<hostname>`.
    #[arg(long = "tls-certificate", env = "TLS_CERTIFICATE")]
    tls_certificate: PathBuf,
    /// Path of the PEM private key of the TLS certificate.
    #[arg(long = "tls-private-key", env = "TLS_PRIVATE_KEY")]
    tls_private_key: PathBuf,
    /// Availability zone within which this process is running.
    #[arg(long, env = "ZONE", default_value = "local")]
    zone: String,
    /// Delegate authorization to the upstream broker and consumer by
    /// forwarding bearer tokens verbatim, instead of checking them locally.
    /// Requires a mutually authenticated channel to the upstream.
    #[arg(long = "auth-passthrough", env = "AUTH_PASSTHROUGH", action(clap::ArgAction::SetTrue))]
    auth_passthrough: bool,

    #[command(flatten)]
    log: logging::LogArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log);

    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("failed to install default crypto provider");

    tracing::info!(hostname = cli.hostname, zone = cli.zone, "starting data-plane-gateway");

    // Shared upstream clients: all gateway services multiplex over one
    // broker connection and one consumer connection.
    let broker_router = gazette::Router::new(&cli.broker_address, &cli.zone);
    let consumer_router = gazette::Router::new(&cli.consumer_address, &cli.zone);

    let journal_client = gazette::journal::Client::new(
        broker_router.clone(),
        gazette::Interceptor::new(None).context("building broker interceptor")?,
    );
    let shard_client = gazette::shard::Client::new(
        consumer_router.clone(),
        gazette::Interceptor::new(None).context("building consumer interceptor")?,
    );

    let app = Arc::new(App {
        hostname: cli.hostname.clone(),
        control_plane_origin: cli.control_plane_origin.clone(),
        verification_key: jsonwebtoken::DecodingKey::from_secret(cli.verification_key.as_bytes()),
        auth_passthrough: cli.auth_passthrough,
        ops_collections: ops::DEFAULT_OPS_COLLECTIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        journal_client,
        shard_client,
    });
    let resolver = Arc::new(resolve::Resolver::new(
        cli.hostname.clone(),
        Arc::new(app.shard_client.clone()),
    ));

    let certs = load_certs(&cli.tls_certificate)
        .context("failed to open or read certificate file")?;
    let key = load_key(&cli.tls_private_key)
        .context("failed to open or read certificate key file")?;

    // Fail fast if the certificate cannot serve the gateway hostname, and
    // warn if it doesn't cover proxy subdomains.
    if !validate_certificate_name(&certs, &cli.hostname)? {
        bail!(
            "provided certificate does not include '{}' as a common or alternative name",
            cli.hostname
        );
    }
    if !validate_certificate_name(&certs, &format!("task-0.{}", cli.hostname))? {
        tracing::warn!(
            hostname = cli.hostname,
            "certificate does not cover subdomains of the gateway hostname; task-port proxying will fail"
        );
    }

    let cancel = tokio_util::sync::CancellationToken::new();

    // Cancel on either SIGINT or SIGTERM.
    {
        let cancel = cancel.clone();
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .context("failed to install SIGTERM handler")?;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
            tracing::info!("received shutdown signal, stopping");
            cancel.cancel();
        });
    }

    // Periodically shed idle upstream channels.
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(120));
            loop {
                ticker.tick().await;
                broker_router.sweep();
                consumer_router.sweep();
            }
        });
    }

    // The TLS front door, and the receiver of its non-proxied connections.
    let (proxy_server, overflow_rx) = proxy::ProxyServer::bind(
        cli.port,
        certs,
        key,
        app.clone(),
        resolver,
        cancel.clone(),
    )
    .await?;

    // Base-domain service: gRPC APIs and the REST mux, split per-request.
    let grpc_router = tonic::service::Routes::new(
        proto_grpc::broker::journal_server::JournalServer::new(grpc::JournalAuthServer::new(
            app.clone(),
        )),
    )
    .add_service(proto_grpc::consumer::shard_server::ShardServer::new(
        grpc::ShardAuthServer::new(app.clone()),
    ))
    .into_axum_router();

    let rest_router = rest::build_router(cli.inference_address.clone(), &cli.cors_origin)?;
    let demux = demux::Demux::new(grpc_router, rest_router);

    let plain_listener = tokio::net::TcpListener::bind(format!("[::]:{}", cli.plain_port))
        .await
        .context("failed to bind plain server port")?;

    let debug_addr: std::net::SocketAddr = format!("[::]:{}", cli.debug_port).parse()?;
    let debug_server = axum_server::bind(debug_addr).serve(metrics_server::build_router().into_make_service());

    tracing::info!(
        port = cli.port,
        plain_port = cli.plain_port,
        debug_port = cli.debug_port,
        "listening"
    );

    let debug_cancel = cancel.clone();
    tokio::try_join!(
        proxy_server.serve(),
        demux::serve_overflow(overflow_rx, demux.clone(), cancel.clone()),
        demux::serve_plain(plain_listener, demux, cancel.clone()),
        async move {
            tokio::select! {
                result = debug_server => result.context("debug server failed"),
                _ = debug_cancel.cancelled() => Ok(()),
            }
        },
    )?;

    tracing::info!("goodbye");
    Ok(())
}

fn load_certs(path: &Path) -> io::Result<Vec<CertificateDer<'static>>> {
    rustls_pemfile::certs(&mut io::BufReader::new(std::fs::File::open(path)?)).collect()
}

fn load_key(path: &Path) -> anyhow::Result<PrivateKeyDer<'static>> {
    rustls_pemfile::private_key(&mut io::BufReader::new(std::fs::File::open(path)?))?
        .ok_or_else(|| anyhow::anyhow!("no private key found in {}", path.display()))
}

fn validate_certificate_name(
    certs: &[CertificateDer<'_>],
    hostname: &str,
) -> anyhow::Result<bool> {
    let parsed_name = webpki::DnsNameRef::try_from_ascii_str(hostname)
        .ok()
        .with_context(|| format!("attempting to parse {hostname} as a DNS name"))?;

    for cert in certs.iter() {
        match webpki::EndEntityCert::try_from(cert.as_ref())
            .map_err(|err| anyhow::anyhow!("failed to parse provided certificate: {err:?}"))?
            .verify_is_valid_for_dns_name(parsed_name)
        {
            Ok(()) => return Ok(true),
            Err(err) => {
                tracing::debug!(error = ?err, hostname, "certificate is not valid for hostname")
            }
        }
    }
    Ok(false)
}
