use crate::app::App;
use crate::server::{self, ServerConfig};
use crate::shutdown::ShutdownController;
use crate::Cli;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "TGFETCH_BIND", default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// Require this key in X-API-Key or a Bearer token
    #[arg(long, env = "TGFETCH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

pub async fn run(cli: &Cli, args: &ServeArgs, shutdown: ShutdownController) -> Result<()> {
    let app = App::connect(cli).await?;
    if let Some(me) = app.health().await.identity {
        log::info!("Serving as {} ({})", me.display_name, me.label());
    }

    let config = ServerConfig {
        bind: args.bind.clone(),
        api_key: args.api_key.clone(),
    };
    server::serve(&config, app, shutdown).await
}
