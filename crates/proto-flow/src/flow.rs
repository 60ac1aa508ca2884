/// NetworkPort describes a port exposed by a connector container,
/// and how it's surfaced by a task's shards.
#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NetworkPort {
    /// Number of this port, in the standard 1..65536 range.
    #[prost(uint32, tag = "1")]
    pub number: u32,
    /// ALPN protocol of this port, or empty if unknown.
    #[prost(string, tag = "2")]
    pub protocol: String,
    /// Is this port public, meaning it does not require authentication?
    #[prost(bool, tag = "3")]
    pub public: bool,
}

/// TaskNetworkProxyRequest opens a connection-oriented proxy stream to a
/// connector container port, and then carries its inbound bytes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskNetworkProxyRequest {
    /// Open is sent as the first message of the stream, and never again.
    #[prost(message, optional, tag = "1")]
    pub open: Option<task_network_proxy_request::Open>,
    /// Data sent from the client to the container.
    #[prost(bytes = "bytes", tag = "2")]
    pub data: ::bytes::Bytes,
}

pub mod task_network_proxy_request {
    use proto_gazette::broker;

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Open {
        /// Header attached by a proxying peer.
        #[prost(message, optional, tag = "1")]
        pub header: Option<broker::Header>,
        /// Shard to which the connection is directed.
        #[prost(string, tag = "2")]
        pub shard_id: String,
        /// Container port to which the connection is directed.
        #[prost(uint32, tag = "3")]
        pub target_port: u32,
        /// Network address of the connecting client.
        #[prost(string, tag = "4")]
        pub client_addr: String,
    }
}

/// TaskNetworkProxyResponse confirms an opened proxy stream, and then carries
/// its outbound bytes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskNetworkProxyResponse {
    /// OpenResponse is sent as the first message of the stream, and never
    /// again.
    #[prost(message, optional, tag = "1")]
    pub open_response: Option<task_network_proxy_response::OpenResponse>,
    /// Data sent from the container to the client.
    #[prost(bytes = "bytes", tag = "2")]
    pub data: ::bytes::Bytes,
}

pub mod task_network_proxy_response {
    use proto_gazette::broker;

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct OpenResponse {
        #[prost(enumeration = "open_response::Status", tag = "1")]
        pub status: i32,
        /// Header of the serving shard primary.
        #[prost(message, optional, tag = "2")]
        pub header: Option<broker::Header>,
    }

    pub mod open_response {
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
        )]
        #[repr(i32)]
        pub enum Status {
            Ok = 0,
            /// The named shard does not exist, or is not served by this
            /// process.
            ShardNotFound = 1,
            /// The shard has no current primary replica.
            NoShardPrimary = 2,
            /// The requested port is not exposed by the shard's task.
            PortNotAllowed = 3,
            /// The shard's container is not running, or refused the
            /// connection.
            InternalError = 4,
        }

        impl Status {
            pub fn as_str_name(&self) -> &'static str {
                match self {
                    Status::Ok => "OK",
                    Status::ShardNotFound => "SHARD_NOT_FOUND",
                    Status::NoShardPrimary => "NO_SHARD_PRIMARY",
                    Status::PortNotAllowed => "PORT_NOT_ALLOWED",
                    Status::InternalError => "INTERNAL_ERROR",
                }
            }
        }
    }

    impl OpenResponse {
        pub fn status_or_internal_error(&self) -> open_response::Status {
            open_response::Status::try_from(self.status)
                .unwrap_or(open_response::Status::InternalError)
        }
    }
}
