use chrono::{DateTime, Utc};
use serde::Serialize;

/// Coarse chat category as exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    User,
    Group,
    Channel,
    Unknown,
}

impl ChatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatKind::User => "user",
            ChatKind::Group => "group",
            ChatKind::Channel => "channel",
            ChatKind::Unknown => "unknown",
        }
    }
}

/// Canonical chat record produced by a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedChat {
    pub numeric_id: i64,
    pub display_name: Option<String>,
    pub handle: Option<String>,
    pub kind: ChatKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Document,
    None,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
            MediaKind::None => "none",
        }
    }
}

/// Per-step projection of a platform message.
#[derive(Debug, Clone)]
pub struct FetchedMessage {
    pub id: i64,
    pub timestamp_utc: DateTime<Utc>,
    pub has_media: bool,
    pub media_kind: MediaKind,
    pub caption_raw: String,
    pub reply_to_id: Option<i64>,
}

/// Downloaded media, owned by the caller once returned.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub suggested_file_name: String,
    pub mime_type: String,
}

/// Maximum caption length (in characters) carried by a [`MediaDescriptor`].
pub const CAPTION_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaDescriptor {
    pub id: i64,
    pub timestamp_utc: DateTime<Utc>,
    pub media_kind: MediaKind,
    pub caption_truncated: String,
}

impl MediaDescriptor {
    pub fn from_message(msg: &FetchedMessage) -> Self {
        Self {
            id: msg.id,
            timestamp_utc: msg.timestamp_utc,
            media_kind: msg.media_kind,
            caption_truncated: clip_caption(&msg.caption_raw),
        }
    }
}

/// Keep at most [`CAPTION_MAX_CHARS`] characters, cutting on a char boundary.
pub fn clip_caption(s: &str) -> String {
    match s.char_indices().nth(CAPTION_MAX_CHARS) {
        Some((end, _)) => s[..end].to_string(),
        None => s.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CorrelationResult {
    Found {
        full_id: i64,
        timestamp_utc: DateTime<Utc>,
    },
    NotFound {
        scanned_count: usize,
    },
}

/// The account the platform connection is authorized as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: i64,
    pub username: Option<String>,
    pub display_name: String,
}

impl Identity {
    /// Username when the account has one, numeric id otherwise.
    pub fn label(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub connected: bool,
    pub identity: Option<Identity>,
}
