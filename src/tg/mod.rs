mod peer;
mod platform;

use anyhow::Result;
use grammers_client::Client;
use grammers_mtsender::SenderPool;
use grammers_session::storages::SqliteSession;
use std::sync::Arc;

/// A connected Telegram client with its pool runner handle.
///
/// Built once per process and shared by every request. Dropping it
/// disconnects and stops the runner.
pub struct TgClient {
    pub client: Client,
    pub session: Arc<SqliteSession>,
    pool_handle: tokio::task::JoinHandle<()>,
}

impl TgClient {
    /// Connect to Telegram using a SQLite session file.
    pub fn connect(session_path: &str, api_id: i32) -> Result<Self> {
        let session = Arc::new(
            SqliteSession::open(session_path)
                .map_err(|e| anyhow::anyhow!("Failed to open session {}: {}", session_path, e))?,
        );

        let pool = SenderPool::new(Arc::clone(&session) as Arc<SqliteSession>, api_id);
        let client = Client::new(&pool);

        // Update delivery is not used; only the runner is kept.
        let SenderPool {
            runner, updates: _, ..
        } = pool;

        let pool_handle = tokio::spawn(async move {
            runner.run().await;
        });

        Ok(TgClient {
            client,
            session,
            pool_handle,
        })
    }
}

impl Drop for TgClient {
    fn drop(&mut self) {
        log::debug!("Disconnecting from Telegram");
        self.client.disconnect();
        self.pool_handle.abort();
    }
}
