use std::sync::Arc;

pub mod auth;
pub mod cache;
pub mod demux;
pub mod grpc;
pub mod logging;
pub mod metrics_server;
pub mod ops;
pub mod proxy;
pub mod resolve;
pub mod rest;
pub mod sni;

/// App holds the gateway's process-wide configuration and its shared clients
/// of the data plane. A single App instance is shared by every listener and
/// every connection.
pub struct App {
    /// Base hostname of the gateway. SNIs which are proper subdomains of this
    /// hostname are proxied to task shards; the hostname itself serves the
    /// gRPC and REST APIs.
    pub hostname: String,
    /// Origin of the control-plane dashboard, which hosts the interactive
    /// flow for obtaining a data-plane access token.
    pub control_plane_origin: url::Url,
    /// Key which verifies bearer tokens signed by the control plane.
    pub verification_key: jsonwebtoken::DecodingKey,
    /// When set, skip local authorization checks and forward the caller's
    /// bearer token to the upstream, which is trusted to enforce its own.
    pub auth_passthrough: bool,
    /// Names of operational-telemetry collections which use an alternative
    /// listing policy (see `ops`).
    pub ops_collections: Vec<String>,
    /// Shared client of the broker Journal service.
    pub journal_client: gazette::journal::Client,
    /// Shared client of the consumer Shard service.
    pub shard_client: gazette::shard::Client,
}

impl App {
    /// The dotted suffix which classifies an SNI as a proxy subdomain.
    pub fn proxy_domain_suffix(&self) -> String {
        format!(".{}", self.hostname)
    }

    /// Is `sni` a proper subdomain of the gateway hostname?
    pub fn is_proxy_subdomain(&self, sni: &str) -> bool {
        let suffix = self.proxy_domain_suffix();
        sni.len() > suffix.len() && sni.ends_with(&suffix)
    }
}

/// Shared handle type for the App.
pub type SharedApp = Arc<App>;

#[cfg(test)]
mod test {
    #[test]
    fn test_proxy_subdomain_classification() {
        let app = super::test_app("gw.example");

        assert!(app.is_proxy_subdomain("task1-6000.gw.example"));
        assert!(app.is_proxy_subdomain("task1-00000000-80000000-8080.gw.example"));

        // The bare hostname, other domains, and degenerate SNIs are not
        // proxied.
        assert!(!app.is_proxy_subdomain("gw.example"));
        assert!(!app.is_proxy_subdomain(".gw.example"));
        assert!(!app.is_proxy_subdomain("task1-6000.other.example"));
        assert!(!app.is_proxy_subdomain(""));
    }
}

#[cfg(test)]
pub fn test_app(hostname: &str) -> App {
    App {
        hostname: hostname.to_string(),
        control_plane_origin: url::Url::parse("https://dashboard.example").unwrap(),
        verification_key: jsonwebtoken::DecodingKey::from_secret(b"supersecret"),
        auth_passthrough: false,
        ops_collections: ops::DEFAULT_OPS_COLLECTIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        journal_client: gazette::journal::Client::new(
            gazette::Router::new("http://localhost:8080", "local"),
            gazette::Interceptor::new(None).unwrap(),
        ),
        shard_client: gazette::shard::Client::new(
            gazette::Router::new("http://localhost:9000", "local"),
            gazette::Interceptor::new(None).unwrap(),
        ),
    }
}
