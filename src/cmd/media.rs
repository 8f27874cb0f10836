use super::ChatArgs;
use crate::app::App;
use crate::out;
use crate::Cli;
use anyhow::Result;
use clap::Args;
use futures::StreamExt;

#[derive(Args, Debug, Clone)]
pub struct MediaArgs {
    #[command(flatten)]
    pub target: ChatArgs,

    /// How many recent messages to inspect (1-200)
    #[arg(long, default_value_t = 20)]
    pub limit: i64,
}

pub async fn run(cli: &Cli, args: &MediaArgs) -> Result<()> {
    let app = App::connect(cli).await?;
    let mut scan = app
        .scan_recent_media(
            args.target.chat.as_deref(),
            args.target.peer.as_deref(),
            args.limit,
        )
        .await?;

    if cli.output.is_json() {
        let mut items = Vec::new();
        while let Some(item) = scan.items.next().await {
            items.push(item?);
        }
        return out::write_json(&serde_json::json!({
            "chat": scan.chat,
            "items": items,
        }));
    }

    // Text mode prints rows as they arrive.
    let quiet = cli.output.is_none();
    if !quiet {
        println!("{}", out::chat_line(&scan.chat));
    }
    let mut count = 0;
    while let Some(item) = scan.items.next().await {
        let item = item?;
        count += 1;
        if !quiet {
            println!("{}", out::media_line(&item));
        }
    }
    if !quiet && count == 0 {
        println!("No media in the last {} messages.", args.limit);
    }
    Ok(())
}
