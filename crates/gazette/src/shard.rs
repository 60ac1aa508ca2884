use proto_gazette::consumer;

// SubClient is the routed sub-client of Client.
type SubClient = proto_grpc::consumer::shard_client::ShardClient<
    tonic::service::interceptor::InterceptedService<
        tonic::transport::Channel,
        crate::Interceptor,
    >,
>;

/// A thin client of the consumer Shard service. Requests are dispatched to
/// the Router's default endpoint, and carry whatever metadata the caller has
/// attached (such as a forwarded Authorization token).
#[derive(Clone)]
pub struct Client {
    interceptor: crate::Interceptor,
    router: crate::Router,
}

impl Client {
    pub fn new(router: crate::Router, interceptor: crate::Interceptor) -> Self {
        Self {
            interceptor,
            router,
        }
    }

    pub async fn list(
        &self,
        req: tonic::Request<consumer::ListRequest>,
    ) -> crate::Result<consumer::ListResponse> {
        let mut client = self.sub_client().await?;
        Ok(client.list(req).await.map_err(crate::Error::Grpc)?.into_inner())
    }

    pub async fn stat(
        &self,
        req: tonic::Request<consumer::StatRequest>,
    ) -> crate::Result<consumer::StatResponse> {
        let mut client = self.sub_client().await?;
        Ok(client.stat(req).await.map_err(crate::Error::Grpc)?.into_inner())
    }

    async fn sub_client(&self) -> crate::Result<SubClient> {
        let channel = self.router.route(None, false).await?;

        Ok(
            proto_grpc::consumer::shard_client::ShardClient::with_interceptor(
                channel,
                self.interceptor.clone(),
            ),
        )
    }
}
