use super::ProxyConnection;
use crate::resolve::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Relay raw TCP bytes between the client connection and the shard tunnel,
/// in both directions, until both complete.
///
/// When the client side reaches EOF the tunnel is shut down (close-send),
/// which unblocks the tunnel read once the upstream drains. Symmetrically,
/// tunnel EOF shuts down the client write half so the client observes the
/// close.
pub async fn proxy_tcp<IO, R>(client: IO, tunnel: ProxyConnection<R>) -> Result<(), Error>
where
    IO: AsyncRead + AsyncWrite + Unpin,
    R: futures::Stream<Item = Result<proto_flow::flow::TaskNetworkProxyResponse, tonic::Status>>
        + Unpin
        + Send,
{
    let hostname = tunnel.hostname.clone();
    let shard = tunnel.shard_id.clone();
    let port = tunnel.target_port.to_string();

    let (mut client_r, mut client_w) = tokio::io::split(client);
    let (mut tunnel_r, mut tunnel_w) = tokio::io::split(tunnel);

    let incoming = async {
        let result = tokio::io::copy(&mut client_r, &mut tunnel_w).await;
        let _ = tunnel_w.shutdown().await;
        result
    };
    let outgoing = async {
        let result = tokio::io::copy(&mut tunnel_r, &mut client_w).await;
        let _ = client_w.shutdown().await;
        result
    };
    let (incoming, outgoing) = tokio::join!(incoming, outgoing);

    if let Ok(bytes) = &incoming {
        metrics::counter!("net_proxy_conn_inbound_bytes_total", "shard" => shard.clone(), "port" => port.clone())
            .increment(*bytes);
    }
    if let Ok(bytes) = &outgoing {
        metrics::counter!("net_proxy_conn_outbound_bytes_total", "shard" => shard, "port" => port)
            .increment(*bytes);
    }

    match (incoming, outgoing) {
        (Ok(incoming_bytes), Ok(outgoing_bytes)) => {
            tracing::debug!(hostname, incoming_bytes, outgoing_bytes, "finished proxy connection");
            Ok(())
        }
        (Err(err), _) | (_, Err(err)) => {
            tracing::warn!(hostname, error = %err, "proxy copy completed with error");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::proxy::connection::test::fixture;
    use bytes::Bytes;
    use proto_flow::flow;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_bidirectional_relay() {
        let (tunnel, mut upstream_rx) = fixture(vec![
            Ok(flow::TaskNetworkProxyResponse {
                open_response: None,
                data: Bytes::from_static(b"response-bytes"),
            }),
        ]);

        let (client, mut server) = tokio::io::duplex(1024);

        let relay = tokio::spawn(proxy_tcp(client, tunnel));

        // Bytes written by the peer arrive upstream as Data frames.
        server.write_all(b"request-bytes").await.unwrap();
        let frame = upstream_rx.recv().await.unwrap();
        assert_eq!(frame.data, Bytes::from_static(b"request-bytes"));

        // Bytes from the upstream arrive at the peer verbatim.
        let mut read_back = vec![0u8; 14];
        tokio::io::AsyncReadExt::read_exact(&mut server, &mut read_back)
            .await
            .unwrap();
        assert_eq!(read_back, b"response-bytes");

        // Closing the client ends the relay cleanly, and close-send was
        // delivered upstream.
        server.shutdown().await.unwrap();
        drop(server);
        relay.await.unwrap().unwrap();
        assert!(upstream_rx.recv().await.is_none());
    }
}
