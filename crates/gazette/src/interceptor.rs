#[derive(Clone)]
pub struct Interceptor(Option<tonic::metadata::AsciiMetadataValue>);

impl Interceptor {
    pub fn new(bearer_token: Option<String>) -> crate::Result<Self> {
        let auth_header = if let Some(token) = bearer_token {
            Some(
                format!("Bearer {}", &token)
                    .parse()
                    .map_err(crate::Error::BearerToken)?,
            )
        } else {
            None
        };

        Ok(Self(auth_header))
    }
}

impl tonic::service::Interceptor for Interceptor {
    fn call(
        &mut self,
        mut request: tonic::Request<()>,
    ) -> Result<tonic::Request<()>, tonic::Status> {
        // A token attached by the caller takes precedence over our own.
        if let (Some(bearer), false) = (
            self.0.as_ref(),
            request.metadata().contains_key("authorization"),
        ) {
            request
                .metadata_mut()
                .insert("authorization", bearer.clone());
        }
        Ok(request)
    }
}
