//! HTTP request handlers.

use super::ServerState;
use crate::error::{ErrorClass, FetchError};
use crate::model::{CorrelationResult, MediaDescriptor, ResolvedChat};
use crate::platform::Platform;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};

const DEFAULT_MEDIA_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub chat_id: Option<String>,
    pub peer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub chat_id: Option<String>,
    pub message_id: i64,
    pub peer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub chat_id: Option<String>,
    pub peer: Option<String>,
    #[serde(default = "default_media_limit")]
    pub limit: i64,
}

fn default_media_limit() -> i64 {
    DEFAULT_MEDIA_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct CorrelateQuery {
    pub chat_id: Option<String>,
    pub short_id: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub chat: ResolvedChat,
    pub items: Vec<MediaDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct CorrelateResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned: Option<usize>,
}

impl From<CorrelationResult> for CorrelateResponse {
    fn from(result: CorrelationResult) -> Self {
        match result {
            CorrelationResult::Found {
                full_id,
                timestamp_utc,
            } => Self {
                found: true,
                full_id: Some(full_id),
                timestamp: Some(timestamp_utc),
                scanned: None,
            },
            CorrelationResult::NotFound { scanned_count } => Self {
                found: false,
                full_id: None,
                timestamp: None,
                scanned: Some(scanned_count),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub kind: &'static str,
}

/// A [`FetchError`] on its way out as an HTTP response.
pub struct ApiError(pub FetchError);

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(err: &FetchError) -> StatusCode {
    match err {
        FetchError::MissingTarget | FetchError::InvalidLimit { .. } => StatusCode::BAD_REQUEST,
        FetchError::NotFound { .. }
        | FetchError::MessageNotFound { .. }
        | FetchError::NoMedia { .. } => StatusCode::NOT_FOUND,
        FetchError::TransferFailed { .. } => StatusCode::BAD_GATEWAY,
        FetchError::Transport { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        match err.class() {
            ErrorClass::RetryLater => log::warn!("Request failed ({}): {}", err.kind(), err),
            _ => log::debug!("Request rejected ({}): {}", err.kind(), err),
        }
        let body = ErrorResponse {
            ok: false,
            error: err.to_string(),
            kind: err.kind(),
        };
        (status_for(&err), Json(body)).into_response()
    }
}

/// `Content-Disposition` value with a header-safe file name.
fn attachment_disposition(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

/// GET /health
pub async fn health<P: Platform>(State(state): State<ServerState<P>>) -> Response {
    let health = state.app.health().await;
    let status = if health.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        ok: health.connected,
        connected: health.connected,
        user: health.identity.map(|i| i.label()),
    };
    (status, Json(body)).into_response()
}

/// GET /resolve
pub async fn resolve<P: Platform>(
    State(state): State<ServerState<P>>,
    Query(q): Query<ChatQuery>,
) -> Result<Json<ResolvedChat>, ApiError> {
    let chat = state
        .app
        .resolve(q.chat_id.as_deref(), q.peer.as_deref())
        .await?;
    Ok(Json(chat))
}

/// GET /download
pub async fn download<P: Platform>(
    State(state): State<ServerState<P>>,
    Query(q): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let payload = state
        .app
        .fetch_media(q.chat_id.as_deref(), q.peer.as_deref(), q.message_id)
        .await?;

    let headers = [
        (header::CONTENT_TYPE, payload.mime_type),
        (
            header::CONTENT_DISPOSITION,
            attachment_disposition(&payload.suggested_file_name),
        ),
    ];
    Ok((headers, payload.bytes).into_response())
}

/// GET /media
pub async fn media<P: Platform>(
    State(state): State<ServerState<P>>,
    Query(q): Query<MediaQuery>,
) -> Result<Json<MediaResponse>, ApiError> {
    let scan = state
        .app
        .scan_recent_media(q.chat_id.as_deref(), q.peer.as_deref(), q.limit)
        .await?;
    let items: Vec<MediaDescriptor> = scan.items.try_collect().await?;
    Ok(Json(MediaResponse {
        chat: scan.chat,
        items,
    }))
}

/// GET /correlate
pub async fn correlate<P: Platform>(
    State(state): State<ServerState<P>>,
    Query(q): Query<CorrelateQuery>,
) -> Result<Json<CorrelateResponse>, ApiError> {
    let result = state
        .app
        .correlate(q.chat_id.as_deref(), q.short_id)
        .await?;
    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::media::MediaShape;
    use crate::server::{build_router, router, ApiKey};
    use crate::testing::{channel, FakeMessage, FakePlatform};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::Router;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    fn test_router(api_key: Option<&str>) -> Router {
        let fake = FakePlatform::new().with_chat(
            channel(-1009876543210, "News", Some("channelname")),
            vec![
                FakeMessage::text(701, "reply").replying_to(634),
                FakeMessage::text(43, "pic").with_media(
                    MediaShape::photo(),
                    "photo_43.jpg",
                    b"jpegbytes",
                ),
                FakeMessage::text(42, "plain"),
            ],
        );
        router(
            App::new(Arc::new(fake)),
            ApiKey::new(api_key.map(str::to_string)),
        )
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec(), disposition)
    }

    fn json(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body, _) = get(test_router(Some("k")), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["connected"], true);
        assert_eq!(v["user"], "fetcher");
    }

    #[tokio::test]
    async fn test_download() {
        let (status, body, disposition) =
            get(test_router(None), "/download?chat_id=@channelname&message_id=43").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"jpegbytes");
        assert_eq!(
            disposition.as_deref(),
            Some("attachment; filename=\"photo_43.jpg\"")
        );
    }

    #[tokio::test]
    async fn test_download_error_kinds() {
        let (status, body, _) =
            get(test_router(None), "/download?chat_id=@channelname&message_id=42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["kind"], "no_media");

        let (status, body, _) =
            get(test_router(None), "/download?chat_id=@channelname&message_id=99999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["kind"], "message_not_found");

        let (status, body, _) = get(test_router(None), "/download?message_id=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["kind"], "missing_target");
    }

    #[tokio::test]
    async fn test_resolve_and_media() {
        let (status, body, _) =
            get(test_router(None), "/resolve?chat_id=-1009876543210").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["numeric_id"], -1009876543210i64);
        assert_eq!(v["kind"], "channel");

        let (status, body, _) = get(test_router(None), "/media?chat_id=@channelname").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["items"].as_array().unwrap().len(), 1);
        assert_eq!(v["items"][0]["media_kind"], "photo");

        let (status, body, _) =
            get(test_router(None), "/media?chat_id=@channelname&limit=500").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["kind"], "invalid_limit");
    }

    #[tokio::test]
    async fn test_correlate() {
        let (status, body, _) =
            get(test_router(None), "/correlate?chat_id=@channelname&short_id=634").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["found"], true);
        assert_eq!(v["full_id"], 701);

        let (_, body, _) =
            get(test_router(None), "/correlate?chat_id=@channelname&short_id=5").await;
        let v = json(&body);
        assert_eq!(v["found"], false);
        assert_eq!(v["scanned"], 3);
    }

    #[tokio::test]
    async fn test_api_key_required() {
        let (status, _, _) = get(test_router(Some("k")), "/resolve?chat_id=@channelname").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let response = test_router(Some("k"))
            .oneshot(
                Request::get("/resolve?chat_id=@channelname")
                    .header("x-api-key", "k")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stalled_download_times_out() {
        let fake = FakePlatform::new()
            .with_chat(
                channel(-1009876543210, "News", Some("channelname")),
                vec![FakeMessage::text(43, "pic").with_media(
                    MediaShape::photo(),
                    "photo_43.jpg",
                    b"jpegbytes",
                )],
            )
            .with_download_gate(Arc::new(Notify::new()));
        let router = build_router(
            App::new(Arc::new(fake)),
            ApiKey::default(),
            Duration::from_millis(50),
        );

        let (status, _, _) = get(router, "/download?chat_id=@channelname&message_id=43").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_attachment_disposition() {
        assert_eq!(
            attachment_disposition("a \"b\".pdf"),
            "attachment; filename=\"a _b_.pdf\""
        );
        assert_eq!(
            attachment_disposition("фото.jpg"),
            "attachment; filename=\"____.jpg\""
        );
    }
}
