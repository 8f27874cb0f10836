//! Media classification from structural shape.
//!
//! The kind is decided from which payload parts are present and from the
//! declared content type. File names are never consulted.

use crate::model::MediaKind;

const VIDEO_PREFIX: &str = "video/";

/// The parts of an attachment the classifier looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaShape {
    pub photo: bool,
    pub document: Option<DocumentShape>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentShape {
    pub mime_type: Option<String>,
}

impl MediaShape {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn photo() -> Self {
        Self {
            photo: true,
            document: None,
        }
    }

    pub fn document(mime_type: Option<&str>) -> Self {
        Self {
            photo: false,
            document: Some(DocumentShape {
                mime_type: mime_type.map(str::to_string),
            }),
        }
    }
}

pub fn classify(shape: &MediaShape) -> MediaKind {
    // Photo wins when a payload presents as both.
    if shape.photo {
        return MediaKind::Photo;
    }
    match &shape.document {
        Some(doc) => match doc.mime_type.as_deref() {
            Some(mime) if is_video(mime) => MediaKind::Video,
            _ => MediaKind::Document,
        },
        None => MediaKind::None,
    }
}

fn is_video(mime: &str) -> bool {
    mime.trim()
        .get(..VIDEO_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(VIDEO_PREFIX))
}
