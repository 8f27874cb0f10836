//! Chat reference normalization.
//!
//! Turns whatever the caller typed (numeric id, `@handle`, link, channel
//! name) into a [`ChatReference`]. Pure and total: never fails, never does I/O.

use std::fmt;

/// Prefix that marks a reference as a handle.
pub const HANDLE_MARKER: char = '@';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReference {
    Numeric(i64),
    Handle(String),
    Invalid,
}

impl ChatReference {
    pub fn is_invalid(&self) -> bool {
        matches!(self, ChatReference::Invalid)
    }
}

impl fmt::Display for ChatReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatReference::Numeric(id) => write!(f, "{}", id),
            ChatReference::Handle(h) => f.write_str(h),
            ChatReference::Invalid => f.write_str("(invalid)"),
        }
    }
}

pub fn normalize(raw: Option<&str>) -> ChatReference {
    let trimmed = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return ChatReference::Invalid,
    };

    if trimmed.starts_with(HANDLE_MARKER) {
        return ChatReference::Handle(trimmed.to_string());
    }

    if looks_numeric(trimmed) {
        // Digit-shaped but out of i64 range: keep it as a free-form reference.
        return match trimmed.parse::<i64>() {
            Ok(id) => ChatReference::Numeric(id),
            Err(_) => ChatReference::Handle(trimmed.to_string()),
        };
    }

    ChatReference::Handle(trimmed.to_string())
}

fn looks_numeric(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
