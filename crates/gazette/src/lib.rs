pub mod journal;
pub mod shard;

mod router;
pub use router::Router;

mod interceptor;
pub use interceptor::Interceptor;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid gRPC endpoint: '{0}'")]
    InvalidEndpoint(String),
    #[error(transparent)]
    Transport(#[from] tonic::transport::Error),
    #[error(transparent)]
    Grpc(#[from] tonic::Status),
    #[error("invalid bearer token")]
    BearerToken(#[source] tonic::metadata::errors::InvalidMetadataValue),
}

pub type Result<Ok> = std::result::Result<Ok, Error>;

/// Dial a gRPC endpoint, which may be a `host:port` URL or a
/// `unix:///path/to/socket` domain socket address.
pub async fn dial_channel(endpoint: &str) -> Result<tonic::transport::Channel> {
    let ep = tonic::transport::Endpoint::from_shared(endpoint.to_string())
        .map_err(|_| Error::InvalidEndpoint(endpoint.to_string()))?
        .connect_timeout(std::time::Duration::from_secs(5));

    let channel = if ep.uri().scheme_str() == Some("unix") {
        ep.connect_with_connector(tower::util::service_fn(
            |uri: tonic::transport::Uri| async move {
                let stream = tokio::net::UnixStream::connect(uri.path().to_string()).await?;
                Ok::<_, std::io::Error>(hyper_util::rt::TokioIo::new(stream))
            },
        ))
        .await?
    } else {
        ep.connect().await?
    };

    Ok(channel)
}
