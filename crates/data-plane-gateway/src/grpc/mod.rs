//! Authorizing proxies of the read-only broker and consumer RPCs.
//!
//! Each RPC verifies the caller's claims, enforces the appropriate prefix
//! policy, and forwards to the shared upstream client with the original
//! bearer token attached. In pass-through mode the local checks are skipped
//! and authorization is delegated to the upstream, which must then be
//! reached over a mutually authenticated channel.

mod journal;
pub use journal::JournalAuthServer;

mod shard;
pub use shard::ShardAuthServer;

/// Build an upstream request of `msg`, carrying the caller's bearer token.
pub(crate) fn forward_request<T>(
    md: &tonic::metadata::MetadataMap,
    msg: T,
) -> tonic::Request<T> {
    let mut req = tonic::Request::new(msg);
    if let Some(authorization) = md.get("authorization") {
        req.metadata_mut()
            .insert("authorization", authorization.clone());
    }
    req
}

/// Map an upstream client error onto the gRPC status returned to the caller.
pub(crate) fn status_from(err: gazette::Error) -> tonic::Status {
    match err {
        gazette::Error::Grpc(status) => status,
        err => tonic::Status::unavailable(err.to_string()),
    }
}
