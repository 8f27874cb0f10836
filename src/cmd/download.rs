use super::ChatArgs;
use crate::app::App;
use crate::error::TgErrorContext;
use crate::out;
use crate::Cli;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub target: ChatArgs,

    /// Message id
    #[arg(long = "id")]
    pub message: i64,

    /// Output file or directory (default: suggested name in the current directory)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

pub async fn run(cli: &Cli, args: &DownloadArgs) -> Result<()> {
    let app = App::connect(cli).await?;
    let payload = app
        .fetch_media(
            args.target.chat.as_deref(),
            args.target.peer.as_deref(),
            args.message,
        )
        .await?;

    let path = match &args.out {
        Some(p) if p.is_dir() => p.join(&payload.suggested_file_name),
        Some(p) => p.clone(),
        None => PathBuf::from(&payload.suggested_file_name),
    };
    let shown = path.display().to_string();
    tokio::fs::write(&path, &payload.bytes)
        .await
        .context_write(&shown)?;

    if cli.output.is_json() {
        out::write_json(&serde_json::json!({
            "path": shown,
            "file_name": payload.suggested_file_name,
            "mime_type": payload.mime_type,
            "size": payload.bytes.len(),
        }))?;
    } else if !cli.output.is_none() {
        println!(
            "Saved {} ({}, {} bytes)",
            shown,
            payload.mime_type,
            payload.bytes.len()
        );
    }
    Ok(())
}
