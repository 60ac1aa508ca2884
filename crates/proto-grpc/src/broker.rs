/// Client stub for the `protocol.Journal` service.
#[cfg(feature = "broker_client")]
pub mod journal_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::wildcard_imports)]
    use proto_gazette::broker;
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct JournalClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl JournalClient<tonic::transport::Channel> {
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

    impl<T> JournalClient<T>
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
        ) -> JournalClient<InterceptedService<T, F>>
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
            JournalClient::new(InterceptedService::new(inner, interceptor))
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

        /// List Journals, their JournalSpecs and current Routes.
        pub async fn list(
            &mut self,
            request: impl tonic::IntoRequest<broker::ListRequest>,
        ) -> std::result::Result<tonic::Response<broker::ListResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/protocol.Journal/List");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("protocol.Journal", "List"));
            self.inner.unary(req, path, codec).await
        }

        /// List Fragments of a Journal.
        pub async fn list_fragments(
            &mut self,
            request: impl tonic::IntoRequest<broker::FragmentsRequest>,
        ) -> std::result::Result<tonic::Response<broker::FragmentsResponse>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/protocol.Journal/ListFragments");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("protocol.Journal", "ListFragments"));
            self.inner.unary(req, path, codec).await
        }

        /// Read from a specific Journal.
        pub async fn read(
            &mut self,
            request: impl tonic::IntoRequest<broker::ReadRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<broker::ReadResponse>>,
            tonic::Status,
        > {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/protocol.Journal/Read");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("protocol.Journal", "Read"));
            self.inner.server_streaming(req, path, codec).await
        }

        /// Append content to a specific Journal.
        pub async fn append(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = broker::AppendRequest>,
        ) -> std::result::Result<tonic::Response<broker::AppendResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/protocol.Journal/Append");
            let mut req = request.into_streaming_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("protocol.Journal", "Append"));
            self.inner.client_streaming(req, path, codec).await
        }

        /// Apply changes to the collection of Journals managed by the
        /// brokers.
        pub async fn apply(
            &mut self,
            request: impl tonic::IntoRequest<broker::ApplyRequest>,
        ) -> std::result::Result<tonic::Response<broker::ApplyResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/protocol.Journal/Apply");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("protocol.Journal", "Apply"));
            self.inner.unary(req, path, codec).await
        }

        /// Replicate appended content of a Journal. Replicate is used between
        /// broker peers in the course of processing Append transactions.
        pub async fn replicate(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = broker::ReplicateRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<broker::ReplicateResponse>>,
            tonic::Status,
        > {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/protocol.Journal/Replicate");
            let mut req = request.into_streaming_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("protocol.Journal", "Replicate"));
            self.inner.streaming(req, path, codec).await
        }
    }
}

/// Server stub for the `protocol.Journal` service.
#[cfg(feature = "broker_server")]
pub mod journal_server {
    #![allow(unused_variables, dead_code, missing_docs, clippy::wildcard_imports)]
    use proto_gazette::broker;
    use tonic::codegen::*;

    /// Trait of methods which a `protocol.Journal` service implements.
    #[async_trait]
    pub trait Journal: Send + Sync + 'static {
        async fn list(
            &self,
            request: tonic::Request<broker::ListRequest>,
        ) -> std::result::Result<tonic::Response<broker::ListResponse>, tonic::Status>;

        async fn list_fragments(
            &self,
            request: tonic::Request<broker::FragmentsRequest>,
        ) -> std::result::Result<tonic::Response<broker::FragmentsResponse>, tonic::Status>;

        /// Server streaming response type for the Read method.
        type ReadStream: tonic::codegen::tokio_stream::Stream<
                Item = std::result::Result<broker::ReadResponse, tonic::Status>,
            > + Send
            + 'static;

        async fn read(
            &self,
            request: tonic::Request<broker::ReadRequest>,
        ) -> std::result::Result<tonic::Response<Self::ReadStream>, tonic::Status>;

        async fn append(
            &self,
            request: tonic::Request<tonic::Streaming<broker::AppendRequest>>,
        ) -> std::result::Result<tonic::Response<broker::AppendResponse>, tonic::Status>;

        async fn apply(
            &self,
            request: tonic::Request<broker::ApplyRequest>,
        ) -> std::result::Result<tonic::Response<broker::ApplyResponse>, tonic::Status>;

        /// Server streaming response type for the Replicate method.
        type ReplicateStream: tonic::codegen::tokio_stream::Stream<
                Item = std::result::Result<broker::ReplicateResponse, tonic::Status>,
            > + Send
            + 'static;

        async fn replicate(
            &self,
            request: tonic::Request<tonic::Streaming<broker::ReplicateRequest>>,
        ) -> std::result::Result<tonic::Response<Self::ReplicateStream>, tonic::Status>;
    }

    #[derive(Debug)]
    pub struct JournalServer<T: Journal> {
        inner: Arc<T>,
        accept_compression_encodings: EnabledCompressionEncodings,
        send_compression_encodings: EnabledCompressionEncodings,
        max_decoding_message_size: Option<usize>,
        max_encoding_message_size: Option<usize>,
    }

    impl<T: Journal> JournalServer<T> {
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

    impl<T, B> tonic::codegen::Service<http::Request<B>> for JournalServer<T>
    where
        T: Journal,
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
                "/protocol.Journal/List" => {
                    #[allow(non_camel_case_types)]
                    struct ListSvc<T: Journal>(pub Arc<T>);
                    impl<T: Journal> tonic::server::UnaryService<broker::ListRequest> for ListSvc<T> {
                        type Response = broker::ListResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<broker::ListRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { <T as Journal>::list(&inner, request).await };
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
                "/protocol.Journal/ListFragments" => {
                    #[allow(non_camel_case_types)]
                    struct ListFragmentsSvc<T: Journal>(pub Arc<T>);
                    impl<T: Journal> tonic::server::UnaryService<broker::FragmentsRequest>
                        for ListFragmentsSvc<T>
                    {
                        type Response = broker::FragmentsResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<broker::FragmentsRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move {
                                <T as Journal>::list_fragments(&inner, request).await
                            };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = ListFragmentsSvc(inner);
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
                "/protocol.Journal/Read" => {
                    #[allow(non_camel_case_types)]
                    struct ReadSvc<T: Journal>(pub Arc<T>);
                    impl<T: Journal> tonic::server::ServerStreamingService<broker::ReadRequest>
                        for ReadSvc<T>
                    {
                        type Response = broker::ReadResponse;
                        type ResponseStream = T::ReadStream;
                        type Future =
                            BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<broker::ReadRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { <T as Journal>::read(&inner, request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = ReadSvc(inner);
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
                        let res = grpc.server_streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/protocol.Journal/Append" => {
                    #[allow(non_camel_case_types)]
                    struct AppendSvc<T: Journal>(pub Arc<T>);
                    impl<T: Journal> tonic::server::ClientStreamingService<broker::AppendRequest>
                        for AppendSvc<T>
                    {
                        type Response = broker::AppendResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<tonic::Streaming<broker::AppendRequest>>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { <T as Journal>::append(&inner, request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = AppendSvc(inner);
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
                        let res = grpc.client_streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/protocol.Journal/Apply" => {
                    #[allow(non_camel_case_types)]
                    struct ApplySvc<T: Journal>(pub Arc<T>);
                    impl<T: Journal> tonic::server::UnaryService<broker::ApplyRequest> for ApplySvc<T> {
                        type Response = broker::ApplyResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<broker::ApplyRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move { <T as Journal>::apply(&inner, request).await };
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
                "/protocol.Journal/Replicate" => {
                    #[allow(non_camel_case_types)]
                    struct ReplicateSvc<T: Journal>(pub Arc<T>);
                    impl<T: Journal> tonic::server::StreamingService<broker::ReplicateRequest>
                        for ReplicateSvc<T>
                    {
                        type Response = broker::ReplicateResponse;
                        type ResponseStream = T::ReplicateStream;
                        type Future =
                            BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<tonic::Streaming<broker::ReplicateRequest>>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut =
                                async move { <T as Journal>::replicate(&inner, request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = ReplicateSvc(inner);
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
                        let res = grpc.streaming(method, req).await;
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

    impl<T: Journal> Clone for JournalServer<T> {
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

    impl<T: Journal> tonic::server::NamedService for JournalServer<T> {
        const NAME: &'static str = "protocol.Journal";
    }
}
