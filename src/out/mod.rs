use crate::model::{CorrelationResult, MediaDescriptor, ResolvedChat};
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output mode for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    /// No output
    None,
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON output
    Json,
}

impl OutputMode {
    pub fn is_json(&self) -> bool {
        matches!(self, OutputMode::Json)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, OutputMode::None)
    }
}

/// Write JSON to stdout.
pub fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Write an error as JSON to stderr.
pub fn write_error_json(err: &anyhow::Error) -> Result<()> {
    let json = serde_json::json!({
        "error": format!("{:#}", err),
    });
    eprintln!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Truncate a string to the given max *character* length with ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else if max > 1 {
        let end_idx = s
            .char_indices()
            .nth(max - 1)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        format!("{}…", &s[..end_idx])
    } else if max == 1 {
        "…".to_string()
    } else {
        String::new()
    }
}

pub fn chat_line(chat: &ResolvedChat) -> String {
    let name = chat.display_name.as_deref().unwrap_or("-");
    match &chat.handle {
        Some(handle) => format!(
            "{}  {}  {} (@{})",
            chat.numeric_id,
            chat.kind.as_str(),
            name,
            handle
        ),
        None => format!("{}  {}  {}", chat.numeric_id, chat.kind.as_str(), name),
    }
}

/// One table row per media item, caption shortened for the terminal.
pub fn media_line(item: &MediaDescriptor) -> String {
    format!(
        "{:<10} {}  {:<8} {}",
        item.id,
        item.timestamp_utc.format("%Y-%m-%d %H:%M"),
        item.media_kind.as_str(),
        truncate(&item.caption_truncated.replace('\n', " "), 50)
    )
}

pub fn correlation_line(short_id: i64, result: &CorrelationResult) -> String {
    match result {
        CorrelationResult::Found {
            full_id,
            timestamp_utc,
        } => format!(
            "{} -> {} ({})",
            short_id,
            full_id,
            timestamp_utc.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        CorrelationResult::NotFound { scanned_count } => format!(
            "{} not found in the last {} messages",
            short_id, scanned_count
        ),
    }
}
