pub mod correlate;
pub mod fetch;
pub mod resolve;
pub mod scan;

use crate::error::TgErrorContext;
use crate::media::classify;
use crate::model::{FetchedMessage, Health, MediaKind};
use crate::platform::{MessageView, Platform};
use crate::tg::TgClient;
use crate::Cli;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Entry point for every core operation.
///
/// Holds the one shared platform connection. Cloning is cheap and every
/// clone talks through the same connection.
pub struct App<P: Platform> {
    platform: Arc<P>,
}

impl<P: Platform> Clone for App<P> {
    fn clone(&self) -> Self {
        Self {
            platform: Arc::clone(&self.platform),
        }
    }
}

impl<P: Platform> App<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub async fn health(&self) -> Health {
        match self.platform.get_self().await {
            Ok(identity) => Health {
                connected: true,
                identity: Some(identity),
            },
            Err(e) => {
                log::warn!("Health check failed: {}", e);
                Health {
                    connected: false,
                    identity: None,
                }
            }
        }
    }
}

impl App<TgClient> {
    /// Connect using the session in the store directory.
    /// An unauthorized session is fatal: nothing can be served without it.
    pub async fn connect(cli: &Cli) -> Result<Self> {
        let api_id = cli
            .api_id
            .context("An API id is required (--api-id or TGFETCH_API_ID)")?;

        let store_dir = cli.store_dir();
        std::fs::create_dir_all(&store_dir).context_session(&store_dir)?;
        let session_path = format!("{}/session.db", store_dir);

        let tg = TgClient::connect(&session_path, api_id)?;

        if !tg.is_authorized().await.context_auth_check()? {
            anyhow::bail!(
                "Session at {} is not authorized. Sign in with an MTProto client first.",
                session_path
            );
        }
        log::info!("Connected to Telegram using {}", session_path);

        Ok(App::new(Arc::new(tg)))
    }
}

/// Project a platform message into the fields the core reasons about.
pub fn inspect<M: MessageView>(msg: &M) -> FetchedMessage {
    let media_kind = classify(&msg.media_shape());
    FetchedMessage {
        id: msg.id(),
        timestamp_utc: msg.date(),
        has_media: media_kind != MediaKind::None,
        media_kind,
        caption_raw: msg.text(),
        reply_to_id: msg.reply_to_id(),
    }
}
