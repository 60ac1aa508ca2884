use proto_gazette::broker;

/// Name of the cookie which may carry a bearer token for interactive HTTP
/// sessions. The `__Host-` prefix binds it to a single origin: browsers only
/// accept it when Secure, set by the host itself, and without a Domain
/// attribute.
pub const AUTH_COOKIE_NAME: &str = "__Host-flow_auth";

/// Label names whose values authorize a listing request. A selector must
/// include at least one of these, and every included value must be authorized
/// by the claims.
const AUTHORIZING_LABELS: &[&str] = &["name", "prefix", labels::COLLECTION, labels::TASK_NAME];

/// Coarse authorization failures. Detailed reasons are logged at debug level
/// rather than returned, so that callers can't distinguish why a token was
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("missing or empty Authorization token")]
    MissingToken,
    #[error("invalid or unsupported Authorization type (expected 'Bearer')")]
    UnsupportedType,
    #[error("invalid Authorization token")]
    InvalidToken,
    #[error("you are not authorized to access this resource")]
    Unauthorized,
    #[error("no authorizing labels provided")]
    NoAuthorizingLabels,
}

impl From<AuthError> for tonic::Status {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::UnsupportedType | AuthError::InvalidToken => {
                tonic::Status::unauthenticated(err.to_string())
            }
            AuthError::Unauthorized | AuthError::NoAuthorizingLabels => {
                tonic::Status::permission_denied(err.to_string())
            }
        }
    }
}

/// Verified claims of a bearer token signed by the control plane.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    /// Name prefixes which these claims authorize.
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Operation for which the token was issued. Carried through for
    /// downstream dispatch, and not consulted by the gateway.
    #[serde(default)]
    pub operation: String,
    /// Expiry, as seconds since the epoch.
    pub exp: u64,
    /// Issued-at, as seconds since the epoch.
    pub iat: u64,
}

/// Decode and validate a signed bearer token.
pub fn decode_jwt(token: &str, key: &jsonwebtoken::DecodingKey) -> Result<Claims, AuthError> {
    let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iat"]);

    let token = jsonwebtoken::decode::<Claims>(token, key, &validation).map_err(|err| {
        tracing::debug!(error = %err, "failed to decode JWT");
        AuthError::InvalidToken
    })?;

    if token.claims.iat > jsonwebtoken::get_current_timestamp() {
        tracing::debug!(iat = token.claims.iat, "JWT iat is in the future");
        return Err(AuthError::InvalidToken);
    }

    Ok(token.claims)
}

/// Extract and verify claims from the metadata of an inbound gRPC request.
pub fn authorized_grpc(
    md: &tonic::metadata::MetadataMap,
    key: &jsonwebtoken::DecodingKey,
) -> Result<Claims, AuthError> {
    let value = match md.get("authorization") {
        None => return Err(AuthError::MissingToken),
        Some(value) => value.to_str().map_err(|_| AuthError::InvalidToken)?,
    };
    decode_jwt(parse_bearer(value)?, key)
}

/// Extract and verify claims from the headers of an inbound HTTP request.
/// An `Authorization` header takes precedence over the auth cookie.
pub fn authorized_http(
    headers: &http::HeaderMap,
    key: &jsonwebtoken::DecodingKey,
) -> Result<Claims, AuthError> {
    if let Some(value) = headers.get(http::header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
        return decode_jwt(parse_bearer(value)?, key);
    }
    match auth_cookie(headers) {
        Some(token) => decode_jwt(&token, key),
        None => Err(AuthError::MissingToken),
    }
}

// The `Bearer ` scheme prefix is matched case-sensitively.
fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    if value.is_empty() {
        Err(AuthError::MissingToken)
    } else if let Some(token) = value.strip_prefix("Bearer ") {
        Ok(token)
    } else {
        Err(AuthError::UnsupportedType)
    }
}

/// The value of the auth cookie, if present.
pub fn auth_cookie(headers: &http::HeaderMap) -> Option<String> {
    for header in headers.get_all(http::header::COOKIE) {
        let Ok(header) = header.to_str() else {
            continue;
        };
        for cookie in header.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name == AUTH_COOKIE_NAME {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Re-write a `Cookie` header value with the auth cookie removed,
/// preserving all other cookies. Returns None if no cookies remain.
pub fn strip_auth_cookie(header: &str) -> Option<String> {
    let remaining = header
        .split(';')
        .map(str::trim)
        .filter(|cookie| match cookie.split_once('=') {
            Some((name, _)) => name != AUTH_COOKIE_NAME,
            None => true,
        })
        .collect::<Vec<_>>()
        .join("; ");

    if remaining.is_empty() {
        None
    } else {
        Some(remaining)
    }
}

/// Enforce that `name` is authorized by some prefix of the claims.
pub fn enforce_prefix(claims: &Claims, name: &str) -> Result<(), AuthError> {
    if claims.prefixes.iter().any(|p| name.starts_with(p)) {
        Ok(())
    } else {
        Err(AuthError::Unauthorized)
    }
}

/// Enforce that a label selector is authorized by the claims: at least one
/// authorizing label must be included, and every included value of an
/// authorizing label must pass `enforce_prefix`.
pub fn enforce_selector_prefix(
    claims: &Claims,
    selector: &broker::LabelSelector,
) -> Result<(), AuthError> {
    let include = selector.include.clone().unwrap_or_default();
    let mut authorized_labels = 0;

    for authorizing_label in AUTHORIZING_LABELS {
        for label in labels::values(&include, authorizing_label) {
            enforce_prefix(claims, &label.value)?;
            authorized_labels += 1;
        }
    }

    if authorized_labels == 0 {
        Err(AuthError::NoAuthorizingLabels)
    } else {
        Ok(())
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    /// Sign `claims` into a bearer token for use in tests.
    pub fn sign_claims(claims: &Claims, secret: &[u8]) -> String {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            claims,
            &jsonwebtoken::EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    pub fn test_claims(prefixes: &[&str]) -> Claims {
        let now = jsonwebtoken::get_current_timestamp();
        Claims {
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            operation: "read".to_string(),
            exp: now + 60,
            iat: now,
        }
    }

    fn key() -> jsonwebtoken::DecodingKey {
        jsonwebtoken::DecodingKey::from_secret(b"supersecret")
    }

    #[test]
    fn test_valid_token_round_trip() {
        let token = sign_claims(&test_claims(&["acme/"]), b"supersecret");
        let claims = decode_jwt(&token, &key()).unwrap();
        assert_eq!(claims.prefixes, vec!["acme/"]);
        assert_eq!(claims.operation, "read");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            prefixes: vec!["acme/".to_string()],
            operation: String::new(),
            exp: now - 10,
            iat: now - 100,
        };
        let token = sign_claims(&claims, b"supersecret");
        assert_eq!(decode_jwt(&token, &key()), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_future_issued_at_is_rejected() {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            prefixes: vec!["acme/".to_string()],
            operation: String::new(),
            exp: now + 120,
            iat: now + 60,
        };
        let token = sign_claims(&claims, b"supersecret");
        assert_eq!(decode_jwt(&token, &key()), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_signing_method_is_rejected() {
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS384),
            &test_claims(&["acme/"]),
            &jsonwebtoken::EncodingKey::from_secret(b"supersecret"),
        )
        .unwrap();
        assert_eq!(decode_jwt(&token, &key()), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = sign_claims(&test_claims(&["acme/"]), b"other-secret");
        assert_eq!(decode_jwt(&token, &key()), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_bearer_scheme_is_case_sensitive() {
        assert!(parse_bearer("Bearer abc").is_ok());
        assert_eq!(parse_bearer("bearer abc"), Err(AuthError::UnsupportedType));
        assert_eq!(parse_bearer("Basic abc"), Err(AuthError::UnsupportedType));
        assert_eq!(parse_bearer(""), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_http_header_takes_precedence_over_cookie() {
        let header_token = sign_claims(&test_claims(&["from-header/"]), b"supersecret");
        let cookie_token = sign_claims(&test_claims(&["from-cookie/"]), b"supersecret");

        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            format!("Bearer {header_token}").parse().unwrap(),
        );
        headers.insert(
            http::header::COOKIE,
            format!("{AUTH_COOKIE_NAME}={cookie_token}").parse().unwrap(),
        );

        let claims = authorized_http(&headers, &key()).unwrap();
        assert_eq!(claims.prefixes, vec!["from-header/"]);

        headers.remove(http::header::AUTHORIZATION);
        let claims = authorized_http(&headers, &key()).unwrap();
        assert_eq!(claims.prefixes, vec!["from-cookie/"]);

        headers.remove(http::header::COOKIE);
        assert_eq!(
            authorized_http(&headers, &key()),
            Err(AuthError::MissingToken)
        );
    }

    #[test]
    fn test_auth_cookie_parsing_amid_other_cookies() {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            format!("session=abc; {AUTH_COOKIE_NAME}=the-token; theme=dark")
                .parse()
                .unwrap(),
        );
        assert_eq!(auth_cookie(&headers).as_deref(), Some("the-token"));

        assert_eq!(
            strip_auth_cookie(&format!("session=abc; {AUTH_COOKIE_NAME}=tok; theme=dark"))
                .as_deref(),
            Some("session=abc; theme=dark"),
        );
        assert_eq!(strip_auth_cookie(&format!("{AUTH_COOKIE_NAME}=tok")), None);
    }

    #[test]
    fn test_enforce_prefix() {
        let claims = test_claims(&["acme/", "other/"]);

        assert!(enforce_prefix(&claims, "acme/task/one").is_ok());
        assert!(enforce_prefix(&claims, "other/").is_ok());
        assert_eq!(
            enforce_prefix(&claims, "evil/task"),
            Err(AuthError::Unauthorized)
        );

        // Adding a prefix never turns an accept into a reject.
        let mut widened = claims.clone();
        widened.prefixes.push("evil/".to_string());
        assert!(enforce_prefix(&widened, "acme/task/one").is_ok());
        assert!(enforce_prefix(&widened, "evil/task").is_ok());
    }

    #[test]
    fn test_empty_prefixes_reject_everything() {
        let claims = test_claims(&[]);
        assert_eq!(enforce_prefix(&claims, ""), Err(AuthError::Unauthorized));
        assert_eq!(
            enforce_prefix(&claims, "anything"),
            Err(AuthError::Unauthorized)
        );
    }

    #[test]
    fn test_enforce_selector_prefix() {
        let claims = test_claims(&["acme/"]);

        let selector = |pairs: &[(&str, &str)]| broker::LabelSelector {
            include: Some(labels::build_set(pairs.iter().copied())),
            exclude: None,
        };

        // An authorized task-name label.
        assert!(enforce_selector_prefix(
            &claims,
            &selector(&[(labels::TASK_NAME, "acme/task")])
        )
        .is_ok());

        // Authorizing labels are each checked, and all must pass.
        assert_eq!(
            enforce_selector_prefix(
                &claims,
                &selector(&[
                    (labels::TASK_NAME, "acme/task"),
                    (labels::COLLECTION, "evil/collection"),
                ])
            ),
            Err(AuthError::Unauthorized),
        );

        // Labels which aren't authorizing are ignored.
        assert_eq!(
            enforce_selector_prefix(
                &claims,
                &selector(&[("estuary.dev/hostname", "acme-host")])
            ),
            Err(AuthError::NoAuthorizingLabels),
        );

        // An empty selector carries no authorizing labels.
        assert_eq!(
            enforce_selector_prefix(&claims, &broker::LabelSelector::default()),
            Err(AuthError::NoAuthorizingLabels),
        );
    }
}
