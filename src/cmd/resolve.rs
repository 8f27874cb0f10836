use super::ChatArgs;
use crate::app::App;
use crate::out;
use crate::Cli;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: ChatArgs,
}

pub async fn run(cli: &Cli, args: &ResolveArgs) -> Result<()> {
    let app = App::connect(cli).await?;
    let chat = app
        .resolve(args.target.chat.as_deref(), args.target.peer.as_deref())
        .await?;

    if cli.output.is_json() {
        out::write_json(&chat)?;
    } else if !cli.output.is_none() {
        println!("{}", out::chat_line(&chat));
    }
    Ok(())
}
