use proto_gazette::broker;

// SubClient is the routed sub-client of Client.
type SubClient = proto_grpc::broker::journal_client::JournalClient<
    tonic::service::interceptor::InterceptedService<
        tonic::transport::Channel,
        crate::Interceptor,
    >,
>;

/// A thin client of the broker Journal service. Requests are dispatched to
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
        req: tonic::Request<broker::ListRequest>,
    ) -> crate::Result<broker::ListResponse> {
        let mut client = self.sub_client().await?;
        Ok(client.list(req).await.map_err(crate::Error::Grpc)?.into_inner())
    }

    pub async fn list_fragments(
        &self,
        req: tonic::Request<broker::FragmentsRequest>,
    ) -> crate::Result<broker::FragmentsResponse> {
        let mut client = self.sub_client().await?;
        Ok(client
            .list_fragments(req)
            .await
            .map_err(crate::Error::Grpc)?
            .into_inner())
    }

    pub async fn read(
        &self,
        req: tonic::Request<broker::ReadRequest>,
    ) -> crate::Result<tonic::codec::Streaming<broker::ReadResponse>> {
        let mut client = self.sub_client().await?;
        Ok(client.read(req).await.map_err(crate::Error::Grpc)?.into_inner())
    }

    async fn sub_client(&self) -> crate::Result<SubClient> {
        let channel = self.router.route(None, false).await?;

        Ok(
            proto_grpc::broker::journal_client::JournalClient::with_interceptor(
                channel,
                self.interceptor.clone(),
            ),
        )
    }
}
