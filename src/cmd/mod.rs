pub mod completions;
pub mod correlate;
pub mod download;
pub mod media;
pub mod resolve;
pub mod serve;
pub mod status;

use crate::shutdown::ShutdownController;
use crate::Cli;
use clap::{Args, Subcommand};

/// Chat selection shared by most commands.
#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Chat id (-100… for channels), @username, or t.me link
    #[arg(long, allow_hyphen_values = true)]
    pub chat: Option<String>,

    /// Overrides --chat when given and non-blank
    #[arg(long, allow_hyphen_values = true)]
    pub peer: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP media service
    Serve(serve::ServeArgs),
    /// Resolve a chat reference
    Resolve(resolve::ResolveArgs),
    /// Download the media attached to a message
    Download(download::DownloadArgs),
    /// List media in the most recent messages of a chat
    Media(media::MediaArgs),
    /// Map a bot-visible message id onto the full-client id
    Correlate(correlate::CorrelateArgs),
    /// Show the connected account
    Status,
    /// Generate shell completions
    Completions {
        /// Shell type to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Command {
    /// `serve` logs through tracing; one-shot commands use env_logger.
    pub fn is_long_running(&self) -> bool {
        matches!(self, Command::Serve(_))
    }
}

pub async fn run(cli: Cli, shutdown: ShutdownController) -> anyhow::Result<()> {
    match &cli.command {
        Command::Serve(args) => serve::run(&cli, args, shutdown).await,
        Command::Resolve(args) => resolve::run(&cli, args).await,
        Command::Download(args) => download::run(&cli, args).await,
        Command::Media(args) => media::run(&cli, args).await,
        Command::Correlate(args) => correlate::run(&cli, args).await,
        Command::Status => status::run(&cli).await,
        Command::Completions { shell } => completions::run(shell),
    }
}
