use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Expected API key. `None` disables the check.
#[derive(Clone, Default)]
pub struct ApiKey(Option<String>);

impl ApiKey {
    pub fn new(key: Option<String>) -> Self {
        Self(key.filter(|k| !k.is_empty()))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Accepts `X-API-Key: <key>` or `Authorization: Bearer <key>`.
    pub fn accepts(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.0 else {
            return true;
        };

        let from_header = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
        let from_bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        [from_header, from_bearer]
            .into_iter()
            .flatten()
            .any(|given| given == expected)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey")
            .field(&self.0.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

pub async fn require_api_key(
    State(key): State<ApiKey>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if key.accepts(request.headers()) {
        Ok(next.run(request).await)
    } else {
        log::debug!("Rejected request to {} without a valid API key", request.uri().path());
        Err(StatusCode::UNAUTHORIZED)
    }
}
