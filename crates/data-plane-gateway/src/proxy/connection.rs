use crate::resolve::{Error, ResolvedShard};
use bytes::Bytes;
use futures::Stream;
use proto_flow::flow;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

type ResponseStream = tonic::codec::Streaming<flow::TaskNetworkProxyResponse>;

/// ProxyConnection adapts the opened NetworkProxy stream into a
/// stream-oriented connection: reads pull Data frames from the response
/// stream, and writes send Data frames on the request stream. Shutdown sends
/// close-send to the upstream, exactly once.
///
/// Deadlines are not modeled; the connection is bounded by cancellation and
/// the HTTP layer's timeouts instead.
#[derive(Debug)]
pub struct ProxyConnection<R = ResponseStream> {
    /// SNI through which the connection arrived.
    pub hostname: String,
    /// Name of the task served by the connection.
    pub task_name: String,
    /// ID of the shard serving the connection.
    pub shard_id: String,
    /// Container port served by the connection.
    pub target_port: u16,

    tx: tokio_util::sync::PollSender<flow::TaskNetworkProxyRequest>,
    rx: R,
    // Remaining Data of the most recent response message, in case the buffer
    // given to a read is too small to hold all of it.
    read_buf: Bytes,
}

/// Open a proxy stream to the primary reactor of `resolved`, sending the
/// `Open` handshake and awaiting its response.
pub async fn open(
    resolved: &ResolvedShard,
    sni: &str,
    client_addr: &str,
) -> Result<ProxyConnection, Error> {
    use proto_flow::flow::task_network_proxy_response::open_response;

    let endpoint = resolved.primary_endpoint();
    tracing::info!(sni, reactor_addr = endpoint, "starting proxy connection");

    let channel = gazette::dial_channel(endpoint).await?;
    let mut client = proto_grpc::flow::network_proxy_client::NetworkProxyClient::new(channel);

    let (tx, rx) = tokio::sync::mpsc::channel(8);
    tx.try_send(flow::TaskNetworkProxyRequest {
        open: Some(flow::task_network_proxy_request::Open {
            header: None,
            shard_id: resolved.shard_id.clone(),
            target_port: resolved.target_port as u32,
            client_addr: client_addr.to_string(),
        }),
        data: Bytes::new(),
    })
    .expect("fresh channel has capacity for the Open message");

    let mut streaming = client
        .proxy(tokio_stream::wrappers::ReceiverStream::new(rx))
        .await?
        .into_inner();

    let opened = streaming.message().await?.ok_or(Error::MissingOpenResponse)?;
    let open_response = opened.open_response.ok_or(Error::MissingOpenResponse)?;

    if open_response.status_or_internal_error() != open_response::Status::Ok {
        return Err(Error::OpenStatus(open_response.status_or_internal_error()));
    }

    Ok(ProxyConnection {
        hostname: sni.to_string(),
        task_name: resolved.labeling.task_name.clone(),
        shard_id: resolved.shard_id.clone(),
        target_port: resolved.target_port,
        tx: tokio_util::sync::PollSender::new(tx),
        rx: streaming,
        read_buf: Bytes::new(),
    })
}

impl<R> AsyncRead for ProxyConnection<R>
where
    R: Stream<Item = Result<flow::TaskNetworkProxyResponse, tonic::Status>> + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let me = self.get_mut();

        // Receive frames until one carries data. An empty frame must not be
        // surfaced as a zero-length read, which a caller takes as EOF.
        while me.read_buf.is_empty() {
            match Pin::new(&mut me.rx).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => return Poll::Ready(Ok(())), // Clean EOF.
                Poll::Ready(Some(Err(status))) => {
                    return Poll::Ready(Err(std::io::Error::other(status)))
                }
                Poll::Ready(Some(Ok(resp))) => me.read_buf = resp.data,
            }
        }

        let n = std::cmp::min(buf.remaining(), me.read_buf.len());
        buf.put_slice(&me.read_buf.split_to(n));
        Poll::Ready(Ok(()))
    }
}

impl<R> AsyncWrite for ProxyConnection<R>
where
    R: Stream<Item = Result<flow::TaskNetworkProxyResponse, tonic::Status>> + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        let me = self.get_mut();

        match me.tx.poll_reserve(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(_)) => {
                Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
            }
            Poll::Ready(Ok(())) => {
                // The entire slice is sent as a single frame.
                if me
                    .tx
                    .send_item(flow::TaskNetworkProxyRequest {
                        open: None,
                        data: Bytes::copy_from_slice(buf),
                    })
                    .is_err()
                {
                    return Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()));
                }
                Poll::Ready(Ok(buf.len()))
            }
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        // Close our sender, which ends the request stream: close-send.
        // PollSender::close is idempotent.
        self.get_mut().tx.close();
        tracing::debug!("closed upstream connection");
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    type TestStream =
        futures::stream::Iter<std::vec::IntoIter<Result<flow::TaskNetworkProxyResponse, tonic::Status>>>;

    /// Build a ProxyConnection over canned response frames, returning the
    /// receiver of its request frames.
    pub fn fixture(
        frames: Vec<Result<flow::TaskNetworkProxyResponse, tonic::Status>>,
    ) -> (
        ProxyConnection<TestStream>,
        tokio::sync::mpsc::Receiver<flow::TaskNetworkProxyRequest>,
    ) {
        let (tx, rx) = tokio::sync::mpsc::channel(8);
        let conn = ProxyConnection {
            hostname: "task1-6000.gw.example".to_string(),
            task_name: "acme/task/one".to_string(),
            shard_id: "capture/acme/task/one/00000000-00000000".to_string(),
            target_port: 6000,
            tx: tokio_util::sync::PollSender::new(tx),
            rx: futures::stream::iter(frames),
            read_buf: Bytes::new(),
        };
        (conn, rx)
    }

    fn data_frame(data: &[u8]) -> Result<flow::TaskNetworkProxyResponse, tonic::Status> {
        Ok(flow::TaskNetworkProxyResponse {
            open_response: None,
            data: Bytes::copy_from_slice(data),
        })
    }

    #[tokio::test]
    async fn test_reads_are_a_pure_relay_under_any_chunking() {
        let (mut conn, _rx) = fixture(vec![
            data_frame(b"hello "),
            data_frame(b""),
            data_frame(b"proxied "),
            data_frame(b"world!"),
        ]);

        // Read with a buffer smaller than some frames: bytes arrive in
        // order, with frame remainders carried across reads.
        let mut buf = [0u8; 5];
        let mut recovered = Vec::new();
        loop {
            let n = conn.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            recovered.extend_from_slice(&buf[..n]);
        }
        assert_eq!(recovered, b"hello proxied world!");
    }

    #[tokio::test]
    async fn test_each_write_sends_one_frame() {
        let (mut conn, mut rx) = fixture(vec![]);

        conn.write_all(b"one").await.unwrap();
        conn.write_all(b"two two").await.unwrap();
        conn.shutdown().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().data, Bytes::from_static(b"one"));
        assert_eq!(rx.recv().await.unwrap().data, Bytes::from_static(b"two two"));
        // Shutdown closed the request stream (close-send).
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_error_surfaces_as_read_error() {
        let (mut conn, _rx) = fixture(vec![
            data_frame(b"ok"),
            Err(tonic::Status::unavailable("upstream broke")),
        ]);

        let mut buf = [0u8; 16];
        assert_eq!(conn.read(&mut buf).await.unwrap(), 2);
        assert!(conn.read(&mut buf).await.is_err());
    }
}
