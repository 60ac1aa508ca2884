/// Client stub for the `consumer.Shard` service.
#[cfg(feature = "consumer_client")]
pub mod shard_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::wildcard_imports)]
    use proto_gazette::consumer;
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct ShardClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl ShardClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> ShardClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }

        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> ShardClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<http::Request<tonic::body::BoxBody>>>::Error:
                Into<StdError> + Send + Sync,
        {
            ShardClient::new(InterceptedService::new(inner, interceptor))
        }

        /// Limits the maximum size of a decoded message.
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }

        /// Limits the maximum size of an encoded message.
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }

        /// List Shards, their ShardSpecs and their processing status.
        pub async fn list(
            &mut self,
            request: impl tonic::IntoRequest<consumer::ListRequest>,
        ) -> std::result::Result<tonic::Response<consumer::ListResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/consumer.Shard/List");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("consumer.Shard", "List"));
            self.inner.unary(req, path, codec).await
        }

        /// Stat returns detailed status of a given Shard.
        pub async fn stat(
            &mut self,
            request: impl tonic::IntoRequest<consumer::StatRequest>,
        ) -> std::result::Result<tonic::Response<consumer::StatResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/consumer.Shard/Stat");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("consumer.Shard", "Stat"));
            self.inner.unary(req, path, codec).await
        }

        /// Apply changes to the collection of Shards managed by the consumer.
        pub async fn apply(
            &mut self,
            request: impl tonic::IntoRequest<consumer::ApplyRequest>,
        ) -> std::result::Result<tonic::Response<consumer::ApplyResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/consumer.Shard/Apply");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("consumer.Shard", "Apply"));
            self.inner.unary(req, path, codec).await
        }

        /// GetHints fetches hints for a shard's recovery log.
        pub async fn get_hints(
            &mut self,
            request: impl tonic::IntoRequest<consumer::GetHintsRequest>,
        ) -> std::result::Result<tonic::Response<consumer::GetHintsResponse>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/consumer.Shard/GetHints");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("consumer.Shard", "GetHints"));
            self.inner.unary(req, path, codec).await
        }

        /// Unassign a Shard.
        pub async fn unassign(
            &mut self,
            request: impl tonic::IntoRequest<consumer::UnassignRequest>,
        ) -> std::result::Result<tonic::Response<consumer::UnassignResponse>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/consumer.Shard/Unassign");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("consumer.Shard", "Unassign"));
            self.inner.unary(req, path, codec).await
        }
    }
}

/// Server stub for the `consumer.Shard` service.
#[cfg(feature = "consumer_server")]
pub mod shard_server {
    #![allow(unused_variables, dead_code, missing_docs, clippy::wildcard_imports)]
    use proto_gazette::consumer;
    use tonic::codegen::*;

    /// Trait of methods which a `consumer.Shard` service implements.
    #[async_trait]
    pub trait Shard: Send + Sync + 'static {
        async fn list(
            &self,
            request: tonic::Request<consumer::ListRequest>,
        ) -> std::result::Result<tonic::Response<consumer::ListResponse>, tonic::Status>;

        async fn stat(
            &self,
            request: tonic::Request<consumer::StatRequest>,
        ) -> std::result::Result<tonic::Response<consumer::StatResponse>, tonic::Status>;

        async fn apply(
            &self,
            request: tonic::Request<consumer::ApplyRequest>,
        ) -> std::result::Result<tonic::Response<consumer::ApplyResponse>, tonic::Status>;

        async fn get_hints(
            &self,
            request: tonic::Request<consumer::GetHintsRequest>,
        ) -> std::result::Result<tonic::Response<consumer::GetHintsResponse>, tonic::Status>;

        async fn unassign(
            &self,
            request: tonic::Request<consumer::UnassignRequest>,
        ) -> std::result::Result<tonic::Response<consumer::UnassignResponse>, tonic::Status>;
    }

    #[derive(Debug)]
    pub struct ShardServer<T: Shard> {
        inner: Arc<T>,
        accept_compression_encodings: EnabledCompressionEncodings,
        send_compression_encodings: EnabledCompressionEncodings,
        max_decoding_message_size: Option<usize>,
        max_encoding_message_size: Option<usize>,
    }

    impl<T: Shard> ShardServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }

        pub fn from_arc(inner: Arc<T>) -> Self {
            Self {
                inner,
                accept_compression_encodings: Default::default(),
                send_compression_encodings: Default::default(),
                max_decoding_message_size: None,
                max_encoding_message_size: None,
            }
        }

        pub fn with_interceptor<F>(inner: T, interceptor: F) -> InterceptedService<Self, F>
        where
            F: tonic::service::Interceptor,
        {
            InterceptedService::new(Self::new(inner), interceptor)
        }

        /// Limits the maximum size of a decoded message.
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.max_decoding_message_size = Some(limit);
            self
        }

        /// Limits the maximum size of an encoded message.
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.max_encoding_message_size = Some(limit);
            self
        }
    }

    impl<T, B> tonic::codegen::Service<http::Request<B>> for ShardServer<T>
    where
        T: Shard,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/consumer.Shard/List" => {
                    #[allow(non_camel_case_types)]
                    struct ListSvc<T: Shard>(pub Arc<T>);
                    impl<T: Shard> tonic::server::UnaryService<consumer::ListRequest> for ListSvc<T> {
                        type Response = consumer::ListResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<consumer::ListRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { <T as Shard>::list(&inner, request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = ListSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            )
                            .apply_max_message_size_config(
                                max_decoding_message_size,
                                max_encoding_message_size,
                            );
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/consumer.Shard/Stat" => {
                    #[allow(non_camel_case_types)]
                    struct StatSvc<T: Shard>(pub Arc<T>);
                    impl<T: Shard> tonic::server::UnaryService<consumer::StatRequest> for StatSvc<T> {
                        type Response = consumer::StatResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<consumer::StatRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { <T as Shard>::stat(&inner, request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = StatSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            )
                            .apply_max_message_size_config(
                                max_decoding_message_size,
                                max_encoding_message_size,
                            );
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/consumer.Shard/Apply" => {
                    #[allow(non_camel_case_types)]
                    struct ApplySvc<T: Shard>(pub Arc<T>);
                    impl<T: Shard> tonic::server::UnaryService<consumer::ApplyRequest> for ApplySvc<T> {
                        type Response = consumer::ApplyResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<consumer::ApplyRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { <T as Shard>::apply(&inner, request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = ApplySvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            )
                            .apply_max_message_size_config(
                                max_decoding_message_size,
                                max_encoding_message_size,
                            );
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/consumer.Shard/GetHints" => {
                    #[allow(non_camel_case_types)]
                    struct GetHintsSvc<T: Shard>(pub Arc<T>);
                    impl<T: Shard> tonic::server::UnaryService<consumer::GetHintsRequest> for GetHintsSvc<T> {
                        type Response = consumer::GetHintsResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<consumer::GetHintsRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { <T as Shard>::get_hints(&inner, request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = GetHintsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            )
                            .apply_max_message_size_config(
                                max_decoding_message_size,
                                max_encoding_message_size,
                            );
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/consumer.Shard/Unassign" => {
                    #[allow(non_camel_case_types)]
                    struct UnassignSvc<T: Shard>(pub Arc<T>);
                    impl<T: Shard> tonic::server::UnaryService<consumer::UnassignRequest> for UnassignSvc<T> {
                        type Response = consumer::UnassignResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<consumer::UnassignRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { <T as Shard>::unassign(&inner, request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = UnassignSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            )
                            .apply_max_message_size_config(
                                max_decoding_message_size,
                                max_encoding_message_size,
                            );
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", tonic::Code::Unimplemented as i32)
                        .header(
                            http::header::CONTENT_TYPE,
                            tonic::metadata::GRPC_CONTENT_TYPE,
                        )
                        .body(empty_body())
                        .unwrap())
                }),
            }
        }
    }

    impl<T: Shard> Clone for ShardServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self {
                inner,
                accept_compression_encodings: self.accept_compression_encodings,
                send_compression_encodings: self.send_compression_encodings,
                max_decoding_message_size: self.max_decoding_message_size,
                max_encoding_message_size: self.max_encoding_message_size,
            }
        }
    }

    impl<T: Shard> tonic::server::NamedService for ShardServer<T> {
        const NAME: &'static str = "consumer.Shard";
    }
}
