use super::peer::{
    chat_record, classify_invocation, marked_id, peer_id_from_marked, private_link_chat,
    username_from_handle, webpage_shape,
};
use super::TgClient;
use crate::media::MediaShape;
use crate::model::Identity;
use crate::platform::{ChatRecord, Entity, MessageView, Platform, PlatformError};
use crate::target::ChatReference;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use grammers_client::types::media::Document;
use grammers_client::types::{Downloadable, Media, Message, Photo};
use grammers_session::defs::PeerRef;
use grammers_session::Session;
use grammers_tl_types as tl;
use std::path::{Path, PathBuf};

impl MessageView for Message {
    fn id(&self) -> i64 {
        Message::id(self) as i64
    }

    fn date(&self) -> DateTime<Utc> {
        Message::date(self)
    }

    fn text(&self) -> String {
        Message::text(self).to_string()
    }

    fn reply_to_id(&self) -> Option<i64> {
        self.reply_to_message_id().map(|id| id as i64)
    }

    fn media_shape(&self) -> MediaShape {
        match self.media() {
            Some(media) => media_shape(&media),
            None => MediaShape::none(),
        }
    }
}

fn media_shape(media: &Media) -> MediaShape {
    match media {
        Media::Photo(_) => MediaShape::photo(),
        Media::Document(d) => MediaShape::document(declared_mime(d.raw.document.as_ref())),
        Media::Sticker(s) => {
            MediaShape::document(declared_mime(s.document.raw.document.as_ref()))
        }
        Media::WebPage(w) => webpage_shape(&w.raw.webpage),
        // Geo, contact, poll, dice and friends carry nothing to download.
        _ => MediaShape::none(),
    }
}

fn declared_mime(document: Option<&tl::enums::Document>) -> Option<&str> {
    match document {
        Some(tl::enums::Document::Document(doc)) => Some(doc.mime_type.as_str()),
        _ => None,
    }
}

/// The media that actually gets downloaded. Link previews are unwrapped to
/// their photo, else their document. `None` when nothing has a file location.
fn download_target(media: Media) -> Option<Media> {
    let target = match media {
        Media::WebPage(w) => webpage_target(&w.raw.webpage)?,
        other => other,
    };
    target.to_raw_input_location().is_some().then_some(target)
}

fn webpage_target(webpage: &tl::enums::WebPage) -> Option<Media> {
    let tl::enums::WebPage::Page(page) = webpage else {
        return None;
    };
    match (&page.photo, &page.document) {
        (Some(photo @ tl::enums::Photo::Photo(_)), _) => {
            Some(Media::Photo(Photo::from_raw(photo.clone())))
        }
        (_, Some(document)) => Some(Media::Document(Document::from_raw_media(
            tl::types::MessageMediaDocument {
                nopremium: false,
                spoiler: false,
                video: false,
                round: false,
                voice: false,
                document: Some(document.clone()),
                alt_documents: None,
                video_cover: None,
                video_timestamp: None,
                ttl_seconds: None,
            },
        ))),
        _ => None,
    }
}

/// File name for the downloaded artifact.
fn artifact_name(message_id: i32, media: &Media) -> String {
    let document = match media {
        Media::Document(d) => d.raw.document.as_ref(),
        Media::Sticker(s) => s.document.raw.document.as_ref(),
        _ => None,
    };

    match document {
        Some(tl::enums::Document::Document(doc)) => document_file_name(doc),
        _ => format!("photo_{}.jpg", message_id),
    }
}

fn document_file_name(doc: &tl::types::Document) -> String {
    let attr_name = doc.attributes.iter().find_map(|attr| match attr {
        tl::enums::DocumentAttribute::Filename(f) => Path::new(&f.file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string),
        _ => None,
    });

    attr_name.filter(|n| !n.is_empty()).unwrap_or_else(|| {
        let ext = mime_guess::get_mime_extensions_str(&doc.mime_type)
            .and_then(|exts| exts.first())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        format!("document_{}{}", doc.id, ext)
    })
}

impl TgClient {
    async fn resolve_handle(&self, handle: &str) -> Result<Entity<PeerRef>, PlatformError> {
        if let Some(id) = private_link_chat(handle) {
            return self.resolve_numeric(id).await;
        }

        let username = username_from_handle(handle)
            .ok_or_else(|| PlatformError::NotFound(format!("not a resolvable handle: {}", handle)))?;

        match self
            .client
            .resolve_username(username)
            .await
            .map_err(|e| classify_invocation(&e))?
        {
            Some(peer) => Ok(Entity {
                peer: PeerRef::from(&peer),
                record: chat_record(&peer),
            }),
            None => Err(PlatformError::NotFound(format!("@{}", username))),
        }
    }

    /// Look through the dialogs first (full record), then fall back to the
    /// access hash cached in the session (id only).
    async fn resolve_numeric(&self, id: i64) -> Result<Entity<PeerRef>, PlatformError> {
        let mut dialogs = self.client.iter_dialogs();
        while let Some(dialog) = dialogs.next().await.map_err(|e| classify_invocation(&e))? {
            let peer = dialog.peer();
            if marked_id(peer) == id {
                return Ok(Entity {
                    peer: PeerRef::from(peer),
                    record: chat_record(peer),
                });
            }
        }

        let peer_id = peer_id_from_marked(id);
        if let Some(info) = self.session.peer(peer_id) {
            log::debug!("Chat {} not in dialogs, using cached session peer", id);
            return Ok(Entity {
                peer: PeerRef {
                    id: peer_id,
                    auth: info.auth(),
                },
                record: ChatRecord::Unknown { id },
            });
        }

        Err(PlatformError::NotFound(format!(
            "chat {} is not in the dialogs or the session",
            id
        )))
    }
}

#[async_trait]
impl Platform for TgClient {
    type Peer = PeerRef;
    type Message = Message;

    async fn is_authorized(&self) -> Result<bool, PlatformError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| classify_invocation(&e))
    }

    async fn resolve_entity(
        &self,
        target: &ChatReference,
    ) -> Result<Entity<Self::Peer>, PlatformError> {
        match target {
            ChatReference::Numeric(id) => self.resolve_numeric(*id).await,
            ChatReference::Handle(handle) => self.resolve_handle(handle).await,
            ChatReference::Invalid => Err(PlatformError::NotFound("empty reference".to_string())),
        }
    }

    async fn get_message_by_id(
        &self,
        peer: &Self::Peer,
        id: i32,
    ) -> Result<Option<Self::Message>, PlatformError> {
        let mut messages = self
            .client
            .get_messages_by_id(*peer, &[id])
            .await
            .map_err(|e| classify_invocation(&e))?;
        Ok(messages.pop().flatten())
    }

    fn iterate_messages(
        &self,
        peer: &Self::Peer,
        limit: usize,
    ) -> BoxStream<'static, Result<Self::Message, PlatformError>> {
        let iter = self.client.iter_messages(*peer).limit(limit);

        // Stop after the first error; the iterator is not resumable past it.
        stream::unfold(Some(iter), |state| async move {
            let mut iter = state?;
            match iter.next().await {
                Ok(Some(msg)) => Some((Ok(msg), Some(iter))),
                Ok(None) => None,
                Err(e) => Some((Err(classify_invocation(&e)), None)),
            }
        })
        .boxed()
    }

    async fn download_media(
        &self,
        message: &Self::Message,
        dest: &Path,
    ) -> Result<Option<PathBuf>, PlatformError> {
        let Some(media) = message.media().and_then(download_target) else {
            log::debug!("Message {} has nothing downloadable", message.id());
            return Ok(None);
        };

        let path = dest.join(artifact_name(message.id(), &media));
        self.client
            .download_media(&media, &path)
            .await
            .map_err(PlatformError::transport)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.len() > 0 => Ok(Some(path)),
            _ => Ok(None),
        }
    }

    async fn get_self(&self) -> Result<Identity, PlatformError> {
        let me = self
            .client
            .get_me()
            .await
            .map_err(|e| classify_invocation(&e))?;
        Ok(Identity {
            id: me.bare_id(),
            username: me.username().map(|s| s.to_string()),
            display_name: me.full_name(),
        })
    }
}
