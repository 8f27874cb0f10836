use crate::app::{inspect, App};
use crate::error::FetchError;
use crate::model::MediaPayload;
use crate::platform::{Platform, PlatformError};
use std::path::Path;

const FALLBACK_FILE_NAME: &str = "file.bin";
const FALLBACK_MIME: &str = "application/octet-stream";

impl<P: Platform> App<P> {
    /// Download the media attached to one message.
    ///
    /// The bytes pass through a private temporary directory that is removed
    /// when this call returns, fails, or is dropped mid-flight.
    pub async fn fetch_media(
        &self,
        reference: Option<&str>,
        peer_override: Option<&str>,
        message_id: i64,
    ) -> Result<MediaPayload, FetchError> {
        let entity = self.resolve_entity(reference, peer_override).await?;
        let chat_id = entity.record.numeric_id();
        let not_found = || FetchError::MessageNotFound {
            chat_id,
            message_id,
        };

        // MTProto ids are 32-bit; anything wider cannot exist.
        let wire_id = i32::try_from(message_id).map_err(|_| not_found())?;

        let message = self
            .platform()
            .get_message_by_id(&entity.peer, wire_id)
            .await
            .map_err(|e| match e {
                PlatformError::NotFound(_) => not_found(),
                e => FetchError::transport("fetching message", e),
            })?
            .ok_or_else(not_found)?;

        let fetched = inspect(&message);
        if !fetched.has_media {
            return Err(FetchError::NoMedia {
                chat_id,
                message_id,
            });
        }

        let transfer_failed = |reason: String| FetchError::TransferFailed { message_id, reason };

        let scratch = tempfile::Builder::new()
            .prefix("tgfetch-")
            .tempdir()
            .map_err(|e| transfer_failed(format!("could not create scratch dir: {}", e)))?;

        let path = self
            .platform()
            .download_media(&message, scratch.path())
            .await
            .map_err(|e| FetchError::transport("downloading media", e))?
            .ok_or_else(|| transfer_failed("download produced no file".to_string()))?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| transfer_failed(format!("could not read {}: {}", path.display(), e)))?;
        if bytes.is_empty() {
            return Err(transfer_failed("download produced an empty file".to_string()));
        }

        let (suggested_file_name, mime_type) = name_and_mime(&path);
        log::info!(
            "Fetched {} ({} bytes, {}) from chat {} message {}",
            suggested_file_name,
            bytes.len(),
            mime_type,
            chat_id,
            message_id
        );

        Ok(MediaPayload {
            bytes,
            suggested_file_name,
            mime_type,
        })
    }
}

/// Final path segment and a content type guessed from it.
pub fn name_and_mime(path: &Path) -> (String, String) {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string();
    let mime = mime_guess::from_path(&name)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string());
    (name, mime)
}
