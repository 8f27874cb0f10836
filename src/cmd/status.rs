use crate::app::App;
use crate::out;
use crate::Cli;
use anyhow::Result;

pub async fn run(cli: &Cli) -> Result<()> {
    let app = App::connect(cli).await?;
    let health = app.health().await;

    if cli.output.is_json() {
        out::write_json(&health)?;
    } else if !cli.output.is_none() {
        match &health.identity {
            Some(me) => println!("Connected as {} ({}, id {})", me.display_name, me.label(), me.id),
            None => println!("Not connected."),
        }
    }

    if !health.connected {
        anyhow::bail!("Telegram connection is not healthy");
    }
    Ok(())
}
