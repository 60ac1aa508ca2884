use super::{forward_request, status_from};
use crate::{auth, SharedApp};
use proto_gazette::consumer;
use proto_grpc::consumer::shard_server::Shard;
use tonic::{Request, Response, Status};

/// ShardAuthServer enforces claims-based authorization of the read-only
/// Shard RPCs, forwarding authorized requests to the consumer.
pub struct ShardAuthServer {
    app: SharedApp,
}

impl ShardAuthServer {
    pub fn new(app: SharedApp) -> Self {
        Self { app }
    }
}

#[tonic::async_trait]
impl Shard for ShardAuthServer {
    async fn list(
        &self,
        req: Request<consumer::ListRequest>,
    ) -> Result<Response<consumer::ListResponse>, Status> {
        let (md, _ext, list_req) = req.into_parts();

        if !self.app.auth_passthrough {
            let claims = auth::authorized_grpc(&md, &self.app.verification_key)?;
            let selector = list_req.selector.clone().unwrap_or_default();
            auth::enforce_selector_prefix(&claims, &selector)?;
        }

        let resp = self
            .app
            .shard_client
            .list(forward_request(&md, list_req))
            .await
            .map_err(status_from)?;
        Ok(Response::new(resp))
    }

    async fn stat(
        &self,
        req: Request<consumer::StatRequest>,
    ) -> Result<Response<consumer::StatResponse>, Status> {
        let (md, _ext, stat_req) = req.into_parts();

        if !self.app.auth_passthrough {
            let claims = auth::authorized_grpc(&md, &self.app.verification_key)?;
            auth::enforce_prefix(&claims, &stat_req.shard)?;
        }

        let resp = self
            .app
            .shard_client
            .stat(forward_request(&md, stat_req))
            .await
            .map_err(status_from)?;
        Ok(Response::new(resp))
    }

    // Only the read-only Shard RPCs are served by the gateway.

    async fn apply(
        &self,
        _req: Request<consumer::ApplyRequest>,
    ) -> Result<Response<consumer::ApplyResponse>, Status> {
        Err(Status::unimplemented("unsupported operation: Apply"))
    }

    async fn get_hints(
        &self,
        _req: Request<consumer::GetHintsRequest>,
    ) -> Result<Response<consumer::GetHintsResponse>, Status> {
        Err(Status::unimplemented("unsupported operation: GetHints"))
    }

    async fn unassign(
        &self,
        _req: Request<consumer::UnassignRequest>,
    ) -> Result<Response<consumer::UnassignResponse>, Status> {
        Err(Status::unimplemented("unsupported operation: Unassign"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::test::{sign_claims, test_claims};
    use std::sync::Arc;

    fn server() -> ShardAuthServer {
        ShardAuthServer::new(Arc::new(crate::test_app("gw.example")))
    }

    #[tokio::test]
    async fn test_list_requires_a_token() {
        let status = server()
            .list(Request::new(consumer::ListRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
    }

    #[tokio::test]
    async fn test_stat_enforces_shard_prefix() {
        let token = sign_claims(&test_claims(&["acme/"]), b"supersecret");
        let mut req = Request::new(consumer::StatRequest {
            shard: "evil/shard".to_string(),
            ..Default::default()
        });
        req.metadata_mut()
            .insert("authorization", format!("Bearer {token}").parse().unwrap());

        let status = server().stat(req).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_write_rpcs_are_unsupported() {
        for code in [
            server()
                .apply(Request::new(consumer::ApplyRequest::default()))
                .await
                .unwrap_err()
                .code(),
            server()
                .get_hints(Request::new(consumer::GetHintsRequest::default()))
                .await
                .unwrap_err()
                .code(),
            server()
                .unassign(Request::new(consumer::UnassignRequest::default()))
                .await
                .unwrap_err()
                .code(),
        ] {
            assert_eq!(code, tonic::Code::Unimplemented);
        }
    }
}
