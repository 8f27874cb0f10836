//! Port to the messaging platform.
//!
//! The core only talks to the platform through [`Platform`]. The production
//! implementation lives in [`crate::tg`]; tests use an in-memory fake.

use crate::media::MediaShape;
use crate::model::{ChatKind, Identity, ResolvedChat};
use crate::target::ChatReference;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Transport(String),
}

impl PlatformError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        PlatformError::Transport(err.to_string())
    }
}

/// Chat record as reported by the platform, one variant per entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRecord {
    User {
        id: i64,
        first_name: Option<String>,
        last_name: Option<String>,
        username: Option<String>,
    },
    Group {
        id: i64,
        title: Option<String>,
    },
    Channel {
        id: i64,
        title: String,
        username: Option<String>,
        megagroup: bool,
    },
    /// Known only by id (e.g. resolved from a cached access hash).
    Unknown { id: i64 },
}

impl ChatRecord {
    pub fn numeric_id(&self) -> i64 {
        match self {
            ChatRecord::User { id, .. }
            | ChatRecord::Group { id, .. }
            | ChatRecord::Channel { id, .. }
            | ChatRecord::Unknown { id } => *id,
        }
    }

    pub fn display_name(&self) -> Option<String> {
        match self {
            ChatRecord::User {
                first_name,
                last_name,
                ..
            } => match (first_name.as_deref(), last_name.as_deref()) {
                (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
                (Some(f), None) => Some(f.to_string()),
                (None, Some(l)) => Some(l.to_string()),
                (None, None) => None,
            },
            ChatRecord::Group { title, .. } => title.clone(),
            ChatRecord::Channel { title, .. } => Some(title.clone()),
            ChatRecord::Unknown { .. } => None,
        }
    }

    pub fn handle(&self) -> Option<String> {
        match self {
            ChatRecord::User { username, .. } | ChatRecord::Channel { username, .. } => {
                username.clone()
            }
            ChatRecord::Group { .. } | ChatRecord::Unknown { .. } => None,
        }
    }

    pub fn kind(&self) -> ChatKind {
        match self {
            ChatRecord::User { .. } => ChatKind::User,
            ChatRecord::Group { .. } => ChatKind::Group,
            ChatRecord::Channel { megagroup: true, .. } => ChatKind::Group,
            ChatRecord::Channel { .. } => ChatKind::Channel,
            ChatRecord::Unknown { .. } => ChatKind::Unknown,
        }
    }

    pub fn to_resolved(&self) -> ResolvedChat {
        ResolvedChat {
            numeric_id: self.numeric_id(),
            display_name: self.display_name(),
            handle: self.handle(),
            kind: self.kind(),
        }
    }
}

/// An addressable chat: the platform's opaque handle plus its record.
#[derive(Debug, Clone)]
pub struct Entity<P> {
    pub peer: P,
    pub record: ChatRecord,
}

/// Read-only view over a platform message.
pub trait MessageView {
    fn id(&self) -> i64;
    fn date(&self) -> DateTime<Utc>;
    fn text(&self) -> String;
    fn reply_to_id(&self) -> Option<i64>;
    fn media_shape(&self) -> MediaShape;
}

#[async_trait]
pub trait Platform: Send + Sync + 'static {
    type Peer: Clone + Send + Sync + 'static;
    type Message: MessageView + Send + Sync + 'static;

    async fn is_authorized(&self) -> Result<bool, PlatformError>;

    /// Look up a chat. Must not be called with [`ChatReference::Invalid`].
    async fn resolve_entity(
        &self,
        target: &ChatReference,
    ) -> Result<Entity<Self::Peer>, PlatformError>;

    async fn get_message_by_id(
        &self,
        peer: &Self::Peer,
        id: i32,
    ) -> Result<Option<Self::Message>, PlatformError>;

    /// Chat history, most recent first, yielding at most `limit` messages.
    fn iterate_messages(
        &self,
        peer: &Self::Peer,
        limit: usize,
    ) -> BoxStream<'static, Result<Self::Message, PlatformError>>;

    /// Download the message's media into `dest` (a directory).
    /// `Ok(None)` means there was nothing to transfer.
    async fn download_media(
        &self,
        message: &Self::Message,
        dest: &Path,
    ) -> Result<Option<PathBuf>, PlatformError>;

    async fn get_self(&self) -> Result<Identity, PlatformError>;
}
