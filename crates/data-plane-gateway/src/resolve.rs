//! Resolution of proxy-subdomain SNIs into a specific task shard and its
//! primary replica.

use crate::{auth, cache::ResolutionCache, sni};
use proto_gazette::{broker, consumer};
use rand::seq::SliceRandom;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sni(#[from] sni::ParseError),
    #[error("no shards matching hostname")]
    NoMatchingShard,
    #[error("no primary shards")]
    NoPrimaryShards,
    #[error("port is not public and protocol is not http")]
    PortNotPublic,
    #[error("error status when listing shards: {0}")]
    ListStatus(consumer::Status),
    #[error("shard '{0}' has an invalid route")]
    BadRoute(String),
    #[error("parsing shard labels: {0}")]
    Labels(#[from] labels::Error),
    #[error(transparent)]
    Upstream(#[from] gazette::Error),
    #[error(transparent)]
    Auth(#[from] auth::AuthError),
    #[error("invalid upstream request: {0}")]
    InvalidRequest(#[from] http::Error),
    #[error("missing open response")]
    MissingOpenResponse,
    #[error("open response status ({}) not OK", .0.as_str_name())]
    OpenStatus(proto_flow::flow::task_network_proxy_response::open_response::Status),
    #[error(transparent)]
    Grpc(#[from] tonic::Status),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Seam over the consumer List RPC, allowing resolution to be exercised
/// without a live consumer.
#[async_trait::async_trait]
pub trait ShardLister: Send + Sync + 'static {
    async fn list(&self, req: consumer::ListRequest) -> gazette::Result<consumer::ListResponse>;
}

#[async_trait::async_trait]
impl ShardLister for gazette::shard::Client {
    async fn list(&self, req: consumer::ListRequest) -> gazette::Result<consumer::ListResponse> {
        self.list(tonic::Request::new(req)).await
    }
}

/// A resolved shard: the outcome of mapping an SNI to a specific shard and
/// its primary replica. ResolvedShards are cached, and hold transient routing
/// state which must not be used once stale.
#[derive(Debug)]
pub struct ResolvedShard {
    /// ID of the resolved shard.
    pub shard_id: String,
    /// Parsed labeling of the shard.
    pub labeling: labels::ShardLabeling,
    /// Route of the shard, with a valid primary index and endpoints.
    pub route: broker::Route,
    /// Task hostname, as parsed from the SNI.
    pub shard_host: String,
    /// Container port to which the connection is directed.
    pub target_port: u16,
    /// When this resolution was fetched.
    pub fetched_at: tokio::time::Instant,
}

impl ResolvedShard {
    /// Configuration of the target port, if the shard's labeling exposes it.
    pub fn port_config(&self) -> Option<&proto_flow::flow::NetworkPort> {
        self.labeling.port_config(self.target_port)
    }

    /// Is the target port public (reachable without authentication)?
    pub fn port_is_public(&self) -> bool {
        self.port_config().is_some_and(|config| config.public)
    }

    /// The configured ALPN protocol of the target port, or empty.
    pub fn port_protocol(&self) -> &str {
        self.port_config()
            .map(|config| config.protocol.as_str())
            .unwrap_or("")
    }

    /// ALPN protocols to offer for a connection to this shard: the
    /// port-config's comma-separated protocol list, or (if it has none) the
    /// client's own offered protocols, unchanged.
    pub fn alpn_protocols(&self, client_offered: &[Vec<u8>]) -> Vec<Vec<u8>> {
        let configured = self.port_protocol();
        if !configured.is_empty() {
            configured
                .split(',')
                .map(|proto| proto.trim().as_bytes().to_vec())
                .collect()
        } else {
            client_offered.to_vec()
        }
    }

    /// gRPC endpoint of the shard's primary replica.
    pub fn primary_endpoint(&self) -> &str {
        &self.route.endpoints[self.route.primary as usize]
    }
}

/// Resolver maps SNIs to shards via the consumer List RPC, caching results
/// across the two phases of each TLS handshake.
pub struct Resolver {
    hostname: String,
    cache: ResolutionCache,
    lister: Arc<dyn ShardLister>,
}

impl Resolver {
    pub fn new(hostname: String, lister: Arc<dyn ShardLister>) -> Self {
        Self {
            hostname,
            cache: ResolutionCache::new(),
            lister,
        }
    }

    /// Resolve `sni`, consulting the cache first. A successful resolution is
    /// cached; failures are not.
    pub async fn resolve(
        &self,
        sni: &str,
        client_addr: &str,
    ) -> Result<Arc<ResolvedShard>, Error> {
        if let Some(resolved) = self.cache.get(sni) {
            return Ok(resolved);
        }
        let resolved = Arc::new(self.do_resolve(sni, client_addr).await?);
        self.cache.put(sni.to_string(), resolved.clone());
        Ok(resolved)
    }

    async fn do_resolve(&self, sni: &str, client_addr: &str) -> Result<ResolvedShard, Error> {
        let query = sni::parse_server_name(sni, &self.hostname)?;

        let mut include = vec![
            (labels::EXPOSE_PORT, query.port.to_string()),
            (labels::HOSTNAME, query.hostname.clone()),
        ];
        if !query.key_begin.is_empty() && !query.r_clock_begin.is_empty() {
            include.push((labels::KEY_BEGIN, query.key_begin.clone()));
            include.push((labels::RCLOCK_BEGIN, query.r_clock_begin.clone()));
        }

        let resp = self
            .lister
            .list(consumer::ListRequest {
                selector: Some(broker::LabelSelector {
                    include: Some(labels::build_set(include)),
                    exclude: None,
                }),
            })
            .await?;

        if resp.status() != consumer::Status::Ok {
            return Err(Error::ListStatus(resp.status()));
        }
        if resp.shards.is_empty() {
            return Err(Error::NoMatchingShard);
        }

        let with_primary: Vec<&consumer::list_response::Shard> = resp
            .shards
            .iter()
            .filter(|shard| shard.route.as_ref().is_some_and(|route| route.primary >= 0))
            .collect();

        // If multiple matched shards have a primary, pick one at random.
        // This sheds load across replicas rather than providing affinity.
        let shard = with_primary
            .choose(&mut rand::thread_rng())
            .ok_or(Error::NoPrimaryShards)?;

        let spec = shard.spec.clone().unwrap_or_default();
        let route = shard.route.clone().unwrap_or_default();

        if route.endpoints.is_empty() || route.primary as usize >= route.endpoints.len() {
            return Err(Error::BadRoute(spec.id));
        }
        let labeling = labels::shard_labeling(&spec.labels.unwrap_or_default())?;

        tracing::debug!(sni, shard_id = %spec.id, client_addr, "resolved proxy host to shard");

        Ok(ResolvedShard {
            shard_id: spec.id,
            labeling,
            route,
            shard_host: query.hostname,
            target_port: query.port,
            fetched_at: tokio::time::Instant::now(),
        })
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use std::sync::Mutex;

    /// A ResolvedShard fixture for cache and proxy tests.
    pub fn resolved_fixture() -> ResolvedShard {
        let set = labels::build_set([
            (labels::HOSTNAME, "task1"),
            (labels::EXPOSE_PORT, "6000"),
            ("estuary.dev/port-public/6000", "true"),
            (labels::EXPOSE_PORT, "8080"),
            ("estuary.dev/port-proto/8080", "http/1.1"),
            (labels::TASK_NAME, "acme/task/one"),
            (labels::TASK_TYPE, "capture"),
        ]);

        ResolvedShard {
            shard_id: "capture/acme/task/one/00000000-00000000".to_string(),
            labeling: labels::shard_labeling(&set).unwrap(),
            route: broker::Route {
                members: vec![broker::process_spec::Id {
                    zone: "us-central1".to_string(),
                    suffix: "reactor-1".to_string(),
                }],
                primary: 0,
                endpoints: vec!["http://reactor-1:9000".to_string()],
            },
            shard_host: "task1".to_string(),
            target_port: 6000,
            fetched_at: tokio::time::Instant::now(),
        }
    }

    /// StubLister returns a canned response and records request selectors.
    pub struct StubLister {
        pub response: consumer::ListResponse,
        pub requests: Mutex<Vec<consumer::ListRequest>>,
    }

    impl StubLister {
        pub fn new(response: consumer::ListResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl ShardLister for StubLister {
        async fn list(
            &self,
            req: consumer::ListRequest,
        ) -> gazette::Result<consumer::ListResponse> {
            self.requests.lock().unwrap().push(req);
            Ok(self.response.clone())
        }
    }

    fn shard_with(
        id: &str,
        primary: i32,
        endpoints: Vec<String>,
    ) -> consumer::list_response::Shard {
        let set = labels::build_set([
            (labels::HOSTNAME, "task1"),
            (labels::EXPOSE_PORT, "6000"),
            (labels::TASK_NAME, "acme/task/one"),
            (labels::TASK_TYPE, "capture"),
        ]);
        consumer::list_response::Shard {
            spec: Some(consumer::ShardSpec {
                id: id.to_string(),
                labels: Some(set),
                ..Default::default()
            }),
            mod_revision: 1,
            route: Some(broker::Route {
                members: endpoints
                    .iter()
                    .enumerate()
                    .map(|(i, _)| broker::process_spec::Id {
                        zone: "local".to_string(),
                        suffix: format!("member-{i}"),
                    })
                    .collect(),
                primary,
                endpoints,
            }),
            status: Vec::new(),
        }
    }

    fn ok_response(shards: Vec<consumer::list_response::Shard>) -> consumer::ListResponse {
        consumer::ListResponse {
            status: consumer::Status::Ok as i32,
            header: None,
            shards,
        }
    }

    #[tokio::test]
    async fn test_resolution_builds_expected_selector() {
        let lister = StubLister::new(ok_response(vec![shard_with(
            "shard-1",
            0,
            vec!["http://reactor:9000".to_string()],
        )]));
        let resolver = Resolver::new("gw.example".to_string(), lister.clone());

        resolver
            .resolve("task1-00000000-80000000-6000.gw.example", "1.2.3.4:555")
            .await
            .unwrap();

        let requests = lister.requests.lock().unwrap();
        let include = requests[0]
            .selector
            .clone()
            .unwrap()
            .include
            .unwrap()
            .labels
            .iter()
            .map(|l| (l.name.clone(), l.value.clone()))
            .collect::<Vec<_>>();

        assert_eq!(
            include,
            vec![
                ("estuary.dev/expose-port".to_string(), "6000".to_string()),
                ("estuary.dev/hostname".to_string(), "task1".to_string()),
                ("estuary.dev/key-begin".to_string(), "00000000".to_string()),
                ("estuary.dev/rclock-begin".to_string(), "80000000".to_string()),
            ],
        );
    }

    #[tokio::test]
    async fn test_no_matching_shards() {
        let lister = StubLister::new(ok_response(vec![]));
        let resolver = Resolver::new("gw.example".to_string(), lister);

        let err = resolver
            .resolve("task1-6000.gw.example", "1.2.3.4:555")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoMatchingShard));
    }

    #[tokio::test]
    async fn test_no_primary_shards() {
        let lister = StubLister::new(ok_response(vec![
            shard_with("shard-1", -1, vec!["http://reactor:9000".to_string()]),
            shard_with("shard-2", -1, vec!["http://reactor:9001".to_string()]),
        ]));
        let resolver = Resolver::new("gw.example".to_string(), lister);

        let err = resolver
            .resolve("task1-6000.gw.example", "1.2.3.4:555")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoPrimaryShards));
    }

    #[tokio::test]
    async fn test_error_status_is_surfaced() {
        let lister = StubLister::new(consumer::ListResponse {
            status: consumer::Status::EtcdTransactionFailed as i32,
            header: None,
            shards: Vec::new(),
        });
        let resolver = Resolver::new("gw.example".to_string(), lister);

        let err = resolver
            .resolve("task1-6000.gw.example", "1.2.3.4:555")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ListStatus(consumer::Status::EtcdTransactionFailed)
        ));
    }

    #[tokio::test]
    async fn test_picks_among_primaries_only() {
        let lister = StubLister::new(ok_response(vec![
            shard_with("shard-1", 0, vec!["http://reactor:9001".to_string()]),
            shard_with("shard-2", -1, vec!["http://reactor:9002".to_string()]),
            shard_with("shard-3", 0, vec!["http://reactor:9003".to_string()]),
            shard_with("shard-4", -1, vec!["http://reactor:9004".to_string()]),
            shard_with("shard-5", 0, vec!["http://reactor:9005".to_string()]),
        ]));
        let resolver = Resolver::new("gw.example".to_string(), lister);

        // The pick is random, but always among shards having a primary.
        // Resolve directly (bypassing the cache) to exercise the choice.
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..50 {
            let resolved = resolver
                .do_resolve("task1-6000.gw.example", "1.2.3.4:555")
                .await
                .unwrap();
            assert!(["shard-1", "shard-3", "shard-5"].contains(&resolved.shard_id.as_str()));
            seen.insert(resolved.shard_id);
        }
        assert!(seen.len() > 1, "expected a uniform pick, got {seen:?}");
    }

    #[tokio::test]
    async fn test_invalid_route_is_rejected() {
        let lister = StubLister::new(ok_response(vec![shard_with("shard-1", 2, vec![
            "http://reactor:9000".to_string(),
        ])]));
        let resolver = Resolver::new("gw.example".to_string(), lister);

        let err = resolver
            .resolve("task1-6000.gw.example", "1.2.3.4:555")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRoute(_)));
    }

    #[tokio::test]
    async fn test_alpn_protocol_selection() {
        let resolved = resolved_fixture();

        // Port 6000 has no configured protocol: the client's offer is used.
        let offered = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
        assert_eq!(resolved.alpn_protocols(&offered), offered);
        assert!(resolved.alpn_protocols(&[]).is_empty());

        // A configured protocol list is comma-split and authoritative.
        let mut resolved = resolved;
        resolved.target_port = 8080;
        assert_eq!(resolved.alpn_protocols(&offered), vec![b"http/1.1".to_vec()]);
    }
}
