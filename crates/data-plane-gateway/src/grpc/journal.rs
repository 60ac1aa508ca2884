use super::{forward_request, status_from};
use crate::{auth, ops, SharedApp};
use proto_gazette::broker;
use proto_grpc::broker::journal_server::Journal;
use tonic::{Request, Response, Status};

/// JournalAuthServer enforces claims-based authorization of the read-only
/// Journal RPCs, forwarding authorized requests to the broker.
pub struct JournalAuthServer {
    app: SharedApp,
}

impl JournalAuthServer {
    pub fn new(app: SharedApp) -> Self {
        Self { app }
    }
}

#[tonic::async_trait]
impl Journal for JournalAuthServer {
    async fn list(
        &self,
        req: Request<broker::ListRequest>,
    ) -> Result<Response<broker::ListResponse>, Status> {
        let (md, _ext, list_req) = req.into_parts();
        let selector = list_req.selector.clone().unwrap_or_default();

        if !self.app.auth_passthrough {
            let claims = auth::authorized_grpc(&md, &self.app.verification_key)?;

            // Listings drawn entirely from ops collections list without
            // prefix enforcement, and filter the response to journals of
            // tasks the claims authorize.
            if let Some(collections) = ops::ops_collections_of(&selector, &self.app.ops_collections)
            {
                let mut resp = self
                    .app
                    .journal_client
                    .list(forward_request(&md, list_req))
                    .await
                    .map_err(status_from)?;

                ops::filter_journals(&mut resp, &ops::allowed_journal_prefixes(&collections, &claims));
                return Ok(Response::new(resp));
            }

            auth::enforce_selector_prefix(&claims, &selector)?;
        }

        let resp = self
            .app
            .journal_client
            .list(forward_request(&md, list_req))
            .await
            .map_err(status_from)?;
        Ok(Response::new(resp))
    }

    async fn list_fragments(
        &self,
        req: Request<broker::FragmentsRequest>,
    ) -> Result<Response<broker::FragmentsResponse>, Status> {
        let (md, _ext, fragments_req) = req.into_parts();

        if !self.app.auth_passthrough {
            let claims = auth::authorized_grpc(&md, &self.app.verification_key)?;
            auth::enforce_prefix(&claims, &fragments_req.journal)?;
        }

        let resp = self
            .app
            .journal_client
            .list_fragments(forward_request(&md, fragments_req))
            .await
            .map_err(status_from)?;
        Ok(Response::new(resp))
    }

    type ReadStream = tonic::codec::Streaming<broker::ReadResponse>;

    async fn read(
        &self,
        req: Request<broker::ReadRequest>,
    ) -> Result<Response<Self::ReadStream>, Status> {
        let (md, _ext, read_req) = req.into_parts();

        if !self.app.auth_passthrough {
            let claims = auth::authorized_grpc(&md, &self.app.verification_key)?;
            auth::enforce_prefix(&claims, &read_req.journal)?;
        }

        // Relay the upstream response stream through to the caller.
        let streaming = self
            .app
            .journal_client
            .read(forward_request(&md, read_req))
            .await
            .map_err(status_from)?;
        Ok(Response::new(streaming))
    }

    // Only the read-only Journal RPCs are served by the gateway.

    async fn append(
        &self,
        _req: Request<tonic::Streaming<broker::AppendRequest>>,
    ) -> Result<Response<broker::AppendResponse>, Status> {
        Err(Status::unimplemented("unsupported operation: Append"))
    }

    async fn apply(
        &self,
        _req: Request<broker::ApplyRequest>,
    ) -> Result<Response<broker::ApplyResponse>, Status> {
        Err(Status::unimplemented("unsupported operation: Apply"))
    }

    type ReplicateStream = futures::stream::Empty<Result<broker::ReplicateResponse, Status>>;

    async fn replicate(
        &self,
        _req: Request<tonic::Streaming<broker::ReplicateRequest>>,
    ) -> Result<Response<Self::ReplicateStream>, Status> {
        Err(Status::unimplemented("unsupported operation: Replicate"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::test::{sign_claims, test_claims};
    use std::sync::Arc;

    fn server() -> JournalAuthServer {
        JournalAuthServer::new(Arc::new(crate::test_app("gw.example")))
    }

    fn authorized_request<T>(msg: T, prefixes: &[&str]) -> Request<T> {
        let token = sign_claims(&test_claims(prefixes), b"supersecret");
        let mut req = Request::new(msg);
        req.metadata_mut()
            .insert("authorization", format!("Bearer {token}").parse().unwrap());
        req
    }

    #[tokio::test]
    async fn test_list_requires_a_token() {
        let status = server()
            .list(Request::new(broker::ListRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
    }

    #[tokio::test]
    async fn test_list_requires_authorizing_labels() {
        let status = server()
            .list(authorized_request(broker::ListRequest::default(), &["acme/"]))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_read_enforces_journal_prefix() {
        let status = server()
            .read(authorized_request(
                broker::ReadRequest {
                    journal: "evil/journal".to_string(),
                    ..Default::default()
                },
                &["acme/"],
            ))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_list_fragments_enforces_journal_prefix() {
        let status = server()
            .list_fragments(authorized_request(
                broker::FragmentsRequest {
                    journal: "evil/journal".to_string(),
                    ..Default::default()
                },
                &["acme/"],
            ))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_write_rpcs_are_unsupported() {
        let status = server()
            .apply(Request::new(broker::ApplyRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unimplemented);
    }
}
