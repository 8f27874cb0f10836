mod app;
mod cmd;
mod error;
mod media;
mod model;
mod out;
mod platform;
mod server;
mod shutdown;
mod target;
mod tg;

#[cfg(test)]
mod testing;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tgfetch",
    version,
    about = "Fetch Telegram media through a user session, over HTTP or the command line"
)]
pub struct Cli {
    /// Store directory holding session.db (default: ~/.tgfetch)
    #[arg(long, global = true, env = "TGFETCH_STORE", default_value = "~/.tgfetch")]
    pub store: String,

    /// Telegram API id of the application the session was created with
    #[arg(long, global = true, env = "TGFETCH_API_ID")]
    pub api_id: Option<i32>,

    /// Output mode: text (default), json, or none
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub output: out::OutputMode,

    #[command(subcommand)]
    pub command: cmd::Command,
}

impl Cli {
    pub fn store_dir(&self) -> String {
        let s = &self.store;
        if s.starts_with("~/") {
            if let Some(home) = dirs_home() {
                return format!("{}{}", home, &s[1..]);
            }
        }
        s.clone()
    }
}

fn dirs_home() -> Option<String> {
    std::env::var("HOME").ok()
}

fn init_logging(long_running: bool) {
    if long_running {
        use tracing_subscriber::EnvFilter;

        // Also picks up `log` records from the rest of the crate.
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        env_logger::init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.command.is_long_running());

    let shutdown = shutdown::ShutdownController::new();
    shutdown.listen_for_ctrl_c();

    let json_errors = cli.output.is_json();
    if let Err(e) = cmd::run(cli, shutdown.clone()).await {
        // Don't report error if we're shutting down gracefully
        if shutdown.is_triggered() {
            std::process::exit(0);
        }
        if json_errors && out::write_error_json(&e).is_ok() {
            std::process::exit(1);
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmd::Command;

    #[test]
    fn test_parse_download() {
        let cli = Cli::try_parse_from([
            "tgfetch",
            "--api-id",
            "12345",
            "download",
            "--chat",
            "@channelname",
            "--id",
            "42",
        ])
        .unwrap();
        assert_eq!(cli.api_id, Some(12345));
        match cli.command {
            Command::Download(args) => {
                assert_eq!(args.target.chat.as_deref(), Some("@channelname"));
                assert_eq!(args.message, 42);
                assert!(args.out.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_media_default_limit() {
        let cli = Cli::try_parse_from(["tgfetch", "media", "--chat", "-1009876543210"]).unwrap();
        match cli.command {
            Command::Media(args) => assert_eq!(args.limit, 20),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve_and_global_output() {
        let cli = Cli::try_parse_from(["tgfetch", "serve", "--bind", "127.0.0.1:9000", "--output", "json"])
            .unwrap();
        assert!(cli.output.is_json());
        assert!(cli.command.is_long_running());
        match cli.command {
            Command::Serve(args) => assert_eq!(args.bind, "127.0.0.1:9000"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_negative_chat_ids() {
        let cli = Cli::try_parse_from([
            "tgfetch",
            "download",
            "--chat",
            "-1009876543210",
            "--id",
            "42",
        ])
        .unwrap();
        match cli.command {
            Command::Download(args) => {
                assert_eq!(args.target.chat.as_deref(), Some("-1009876543210"));
                assert_eq!(args.message, 42);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "tgfetch",
            "correlate",
            "--chat",
            "-1009876543210",
            "--short-id",
            "634",
        ])
        .unwrap();
        match cli.command {
            Command::Correlate(args) => {
                assert_eq!(args.chat.as_deref(), Some("-1009876543210"));
                assert_eq!(args.short_id, 634);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli =
            Cli::try_parse_from(["tgfetch", "resolve", "--chat", "@x", "--peer", "-4242"]).unwrap();
        match cli.command {
            Command::Resolve(args) => assert_eq!(args.target.peer.as_deref(), Some("-4242")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_correlate_requires_short_id() {
        assert!(Cli::try_parse_from(["tgfetch", "correlate", "--chat", "@x"]).is_err());
    }

    #[test]
    fn test_store_dir_absolute_path() {
        let cli = Cli::try_parse_from(["tgfetch", "--store", "/tmp/tgf", "status"]).unwrap();
        assert_eq!(cli.store_dir(), "/tmp/tgf");
    }
}
