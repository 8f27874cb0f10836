//! Conversions between grammers peers and the crate's chat records.
//!
//! Numeric ids use the "marked" numbering shared with the Bot API:
//! users are positive, basic groups are `-id`, channels and supergroups
//! are `-100<id>`.

use crate::media::{DocumentShape, MediaShape};
use crate::platform::{ChatRecord, PlatformError};
use grammers_client::types::Peer;
use grammers_mtsender::InvocationError;
use grammers_session::defs::PeerId;
use grammers_tl_types as tl;

const CHANNEL_MARK: i64 = -1_000_000_000_000;

/// RPC errors meaning "there is no such chat (for us)".
const NOT_FOUND_RPC: &[&str] = &[
    "USERNAME_NOT_OCCUPIED",
    "USERNAME_INVALID",
    "PEER_ID_INVALID",
    "CHANNEL_INVALID",
    "CHANNEL_PRIVATE",
    "CHAT_ID_INVALID",
    "MESSAGE_ID_INVALID",
];

const LINK_PREFIXES: &[&str] = &[
    "https://t.me/",
    "http://t.me/",
    "t.me/",
    "https://telegram.me/",
    "http://telegram.me/",
    "telegram.me/",
];

pub fn marked_id(peer: &Peer) -> i64 {
    let bare = peer.id().bare_id();
    match peer {
        Peer::User(_) => bare,
        Peer::Group(_) => -bare,
        Peer::Channel(_) => CHANNEL_MARK - bare,
    }
}

/// Invert [`marked_id`].
pub fn peer_id_from_marked(id: i64) -> PeerId {
    if id > 0 {
        PeerId::user(id)
    } else if id < CHANNEL_MARK {
        PeerId::channel(CHANNEL_MARK - id)
    } else {
        PeerId::chat(-id)
    }
}

pub fn chat_record(peer: &Peer) -> ChatRecord {
    let id = marked_id(peer);
    match peer {
        Peer::User(u) => ChatRecord::User {
            id,
            first_name: u.first_name().map(|s| s.to_string()),
            last_name: u.last_name().map(|s| s.to_string()),
            username: u.username().map(|s| s.to_string()),
        },
        Peer::Group(g) => ChatRecord::Group {
            id,
            title: g.title().map(|s| s.to_string()),
        },
        Peer::Channel(c) => ChatRecord::Channel {
            id,
            title: c.title().to_string(),
            username: c.username().map(|s| s.to_string()),
            megagroup: c.raw.megagroup,
        },
    }
}

fn strip_link_prefix(handle: &str) -> Option<&str> {
    LINK_PREFIXES
        .iter()
        .find_map(|prefix| handle.strip_prefix(prefix))
}

/// Extract a username from `@name`, `name`, or a `t.me/name` link.
/// Returns `None` for invite links, private post links and empty input.
pub fn username_from_handle(handle: &str) -> Option<&str> {
    let handle = handle.trim();
    let rest = strip_link_prefix(handle).unwrap_or(handle);
    let rest = rest.strip_prefix('@').unwrap_or(rest);
    let name = rest.split(['/', '?']).next().unwrap_or("");
    if name.is_empty() || name.starts_with('+') || name == "joinchat" || name == "c" {
        return None;
    }
    Some(name)
}

/// Marked channel id from a private post link, `t.me/c/<id>/<post>`.
pub fn private_link_chat(handle: &str) -> Option<i64> {
    let rest = strip_link_prefix(handle.trim())?.strip_prefix("c/")?;
    let bare: i64 = rest.split(['/', '?']).next()?.parse().ok()?;
    (bare > 0).then(|| CHANNEL_MARK - bare)
}

pub fn classify_invocation(err: &InvocationError) -> PlatformError {
    match err {
        InvocationError::Rpc(rpc) if NOT_FOUND_RPC.contains(&rpc.name.as_str()) => {
            PlatformError::NotFound(rpc.name.clone())
        }
        other => PlatformError::transport(other),
    }
}

/// Structural shape of a link preview: it may carry a photo, a document, or both.
pub fn webpage_shape(webpage: &tl::enums::WebPage) -> MediaShape {
    let tl::enums::WebPage::Page(page) = webpage else {
        return MediaShape::none();
    };
    MediaShape {
        photo: matches!(page.photo, Some(tl::enums::Photo::Photo(_))),
        document: page.document.as_ref().map(document_shape),
    }
}

fn document_shape(document: &tl::enums::Document) -> DocumentShape {
    match document {
        tl::enums::Document::Document(doc) => DocumentShape {
            mime_type: Some(doc.mime_type.clone()),
        },
        tl::enums::Document::Empty(_) => DocumentShape { mime_type: None },
    }
}
