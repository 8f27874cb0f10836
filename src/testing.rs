//! In-memory [`Platform`] for tests.

use crate::media::MediaShape;
use crate::model::Identity;
use crate::platform::{ChatRecord, Entity, MessageView, Platform, PlatformError};
use crate::target::ChatReference;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub struct FakeMessage {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub text: String,
    pub reply_to_id: Option<i64>,
    pub shape: MediaShape,
    /// (file name, bytes) written by `download_media`.
    pub content: Option<(String, Vec<u8>)>,
}

impl FakeMessage {
    pub fn text(id: i64, text: &str) -> Self {
        Self {
            id,
            date: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
            text: text.to_string(),
            reply_to_id: None,
            shape: MediaShape::none(),
            content: None,
        }
    }

    pub fn with_media(mut self, shape: MediaShape, name: &str, bytes: &[u8]) -> Self {
        self.shape = shape;
        self.content = Some((name.to_string(), bytes.to_vec()));
        self
    }

    pub fn replying_to(mut self, id: i64) -> Self {
        self.reply_to_id = Some(id);
        self
    }
}

impl MessageView for FakeMessage {
    fn id(&self) -> i64 {
        self.id
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn reply_to_id(&self) -> Option<i64> {
        self.reply_to_id
    }

    fn media_shape(&self) -> MediaShape {
        self.shape.clone()
    }
}

#[derive(Default)]
pub struct FakePlatform {
    chats: Vec<ChatRecord>,
    /// Newest first, keyed by chat id.
    history: Vec<(i64, Vec<FakeMessage>)>,
    pub authorized: bool,
    pub identity: Option<Identity>,
    pub fail_resolve_transport: bool,
    pub fail_history_after: Option<usize>,
    pub calls: AtomicUsize,
    pub inspected: Arc<AtomicUsize>,
    pub download_dirs: Mutex<Vec<PathBuf>>,
    /// When set, `download_media` waits for a notification before writing.
    pub download_gate: Option<Arc<Notify>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            authorized: true,
            identity: Some(Identity {
                id: 777,
                username: Some("fetcher".to_string()),
                display_name: "Fetcher".to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn with_chat(mut self, record: ChatRecord, mut messages: Vec<FakeMessage>) -> Self {
        messages.sort_by(|a, b| b.id.cmp(&a.id));
        self.history.push((record.numeric_id(), messages));
        self.chats.push(record);
        self
    }

    /// Park every download until `gate` is notified.
    pub fn with_download_gate(mut self, gate: Arc<Notify>) -> Self {
        self.download_gate = Some(gate);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inspected_count(&self) -> usize {
        self.inspected.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn messages(&self, chat_id: i64) -> &[FakeMessage] {
        self.history
            .iter()
            .find(|(id, _)| *id == chat_id)
            .map(|(_, m)| m.as_slice())
            .unwrap_or(&[])
    }
}

/// Channel record used across tests.
pub fn channel(id: i64, title: &str, username: Option<&str>) -> ChatRecord {
    ChatRecord::Channel {
        id,
        title: title.to_string(),
        username: username.map(str::to_string),
        megagroup: false,
    }
}

#[async_trait]
impl Platform for FakePlatform {
    type Peer = i64;
    type Message = FakeMessage;

    async fn is_authorized(&self) -> Result<bool, PlatformError> {
        self.touch();
        Ok(self.authorized)
    }

    async fn resolve_entity(
        &self,
        target: &ChatReference,
    ) -> Result<Entity<Self::Peer>, PlatformError> {
        self.touch();
        if self.fail_resolve_transport {
            return Err(PlatformError::Transport("FLOOD_WAIT (value: 30)".to_string()));
        }
        let found = self.chats.iter().find(|c| match target {
            ChatReference::Numeric(id) => c.numeric_id() == *id,
            ChatReference::Handle(h) => {
                let wanted = h.trim_start_matches('@');
                c.handle().is_some_and(|u| u.eq_ignore_ascii_case(wanted))
            }
            ChatReference::Invalid => false,
        });
        match found {
            Some(record) => Ok(Entity {
                peer: record.numeric_id(),
                record: record.clone(),
            }),
            None => Err(PlatformError::NotFound(format!(
                "USERNAME_NOT_OCCUPIED ({})",
                target
            ))),
        }
    }

    async fn get_message_by_id(
        &self,
        peer: &Self::Peer,
        id: i32,
    ) -> Result<Option<Self::Message>, PlatformError> {
        self.touch();
        Ok(self
            .messages(*peer)
            .iter()
            .find(|m| m.id == id as i64)
            .cloned())
    }

    fn iterate_messages(
        &self,
        peer: &Self::Peer,
        limit: usize,
    ) -> BoxStream<'static, Result<Self::Message, PlatformError>> {
        self.touch();
        let inspected = Arc::clone(&self.inspected);
        let fail_after = self.fail_history_after;
        let items: Vec<_> = self
            .messages(*peer)
            .iter()
            .take(limit)
            .cloned()
            .enumerate()
            .map(move |(i, m)| match fail_after {
                Some(n) if i >= n => Err(PlatformError::Transport("connection dropped".to_string())),
                _ => Ok(m),
            })
            .collect();
        stream::iter(items)
            .inspect(move |_| {
                inspected.fetch_add(1, Ordering::SeqCst);
            })
            .boxed()
    }

    async fn download_media(
        &self,
        message: &Self::Message,
        dest: &Path,
    ) -> Result<Option<PathBuf>, PlatformError> {
        self.touch();
        self.download_dirs.lock().unwrap().push(dest.to_path_buf());
        if let Some(gate) = &self.download_gate {
            gate.notified().await;
        }
        let Some((name, bytes)) = &message.content else {
            return Ok(None);
        };
        let path = dest.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(PlatformError::transport)?;
        Ok(Some(path))
    }

    async fn get_self(&self) -> Result<Identity, PlatformError> {
        self.touch();
        self.identity
            .clone()
            .ok_or_else(|| PlatformError::Transport("not connected".to_string()))
    }
}
