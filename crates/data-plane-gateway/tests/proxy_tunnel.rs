//! End-to-end exercise of the shard tunnel against an in-process reactor.

use bytes::Bytes;
use data_plane_gateway::proxy::connection;
use data_plane_gateway::resolve;
use proto_flow::flow;
use proto_gazette::broker;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};

/// A reactor which accepts Open of port 6000 only, and echoes Data frames.
struct EchoReactor;

#[tonic::async_trait]
impl proto_grpc::flow::network_proxy_server::NetworkProxy for EchoReactor {
    type ProxyStream = ReceiverStream<Result<flow::TaskNetworkProxyResponse, Status>>;

    async fn proxy(
        &self,
        request: Request<Streaming<flow::TaskNetworkProxyRequest>>,
    ) -> Result<Response<Self::ProxyStream>, Status> {
        use flow::task_network_proxy_response::{open_response, OpenResponse};

        let mut inbound = request.into_inner();
        let (tx, rx) = tokio::sync::mpsc::channel(8);

        tokio::spawn(async move {
            let Ok(Some(first)) = inbound.message().await else {
                return;
            };
            let Some(open) = first.open else {
                let _ = tx
                    .send(Err(Status::invalid_argument("expected Open")))
                    .await;
                return;
            };

            let status = if open.target_port == 6000 {
                open_response::Status::Ok
            } else {
                open_response::Status::PortNotAllowed
            };
            let _ = tx
                .send(Ok(flow::TaskNetworkProxyResponse {
                    open_response: Some(OpenResponse {
                        status: status as i32,
                        header: None,
                    }),
                    data: Bytes::new(),
                }))
                .await;

            if status != open_response::Status::Ok {
                return;
            }
            while let Ok(Some(msg)) = inbound.message().await {
                if tx
                    .send(Ok(flow::TaskNetworkProxyResponse {
                        open_response: None,
                        data: msg.data,
                    }))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

async fn start_reactor() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(proto_grpc::flow::network_proxy_server::NetworkProxyServer::new(
                EchoReactor,
            ))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener)),
    );
    addr
}

fn resolved_shard(reactor: std::net::SocketAddr, target_port: u16) -> resolve::ResolvedShard {
    let set = labels::build_set([
        (labels::HOSTNAME, "task1"),
        (labels::EXPOSE_PORT, "6000"),
        ("estuary.dev/port-public/6000", "true"),
        (labels::TASK_NAME, "acme/task/one"),
        (labels::TASK_TYPE, "capture"),
    ]);

    resolve::ResolvedShard {
        shard_id: "capture/acme/task/one/00000000-00000000".to_string(),
        labeling: labels::shard_labeling(&set).unwrap(),
        route: broker::Route {
            members: vec![broker::process_spec::Id {
                zone: "local".to_string(),
                suffix: "reactor-1".to_string(),
            }],
            primary: 0,
            endpoints: vec![format!("http://{reactor}")],
        },
        shard_host: "task1".to_string(),
        target_port,
        fetched_at: tokio::time::Instant::now(),
    }
}

#[tokio::test]
async fn test_tunnel_relays_bytes_through_a_live_stream() {
    let reactor = start_reactor().await;
    let resolved = resolved_shard(reactor, 6000);

    let mut tunnel = connection::open(&resolved, "task1-6000.gw.example", "1.2.3.4:555")
        .await
        .unwrap();

    // Bytes written are echoed back verbatim, regardless of write chunking.
    tunnel.write_all(b"hello ").await.unwrap();
    tunnel.write_all(b"tunnel").await.unwrap();

    let mut echoed = vec![0u8; 12];
    tunnel.read_exact(&mut echoed).await.unwrap();
    assert_eq!(echoed, b"hello tunnel");

    // Shutdown sends close-send; the reactor drains and ends its stream.
    tunnel.shutdown().await.unwrap();
    let mut rest = Vec::new();
    tunnel.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}

#[tokio::test]
async fn test_non_ok_open_response_aborts_the_connection() {
    let reactor = start_reactor().await;
    let resolved = resolved_shard(reactor, 7000);

    let err = connection::open(&resolved, "task1-7000.gw.example", "1.2.3.4:555")
        .await
        .unwrap_err();
    assert!(matches!(err, resolve::Error::OpenStatus(_)), "{err}");
}
