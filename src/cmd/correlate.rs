use crate::app::App;
use crate::out;
use crate::Cli;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct CorrelateArgs {
    /// Chat id, @username, or t.me link
    #[arg(long, allow_hyphen_values = true)]
    pub chat: Option<String>,

    /// Message id as seen by the bot
    #[arg(long)]
    pub short_id: i64,
}

pub async fn run(cli: &Cli, args: &CorrelateArgs) -> Result<()> {
    let app = App::connect(cli).await?;
    let result = app.correlate(args.chat.as_deref(), args.short_id).await?;

    if cli.output.is_json() {
        out::write_json(&result)?;
    } else if !cli.output.is_none() {
        println!("{}", out::correlation_line(args.short_id, &result));
    }
    Ok(())
}
