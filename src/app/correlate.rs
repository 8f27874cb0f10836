use crate::app::{inspect, App};
use crate::error::FetchError;
use crate::model::{CorrelationResult, FetchedMessage};
use crate::platform::Platform;
use futures::StreamExt;

/// How many of the newest messages a correlation looks at.
pub const CORRELATION_WINDOW: usize = 100;

impl<P: Platform> App<P> {
    /// Map an id from the bot-level numbering onto the full-client one.
    ///
    /// First match in scan order wins: either the message's own id or the id
    /// it replies to equals `short_id`. Running out of window is not an error.
    pub async fn correlate(
        &self,
        reference: Option<&str>,
        short_id: i64,
    ) -> Result<CorrelationResult, FetchError> {
        let entity = self.resolve_entity(reference, None).await?;

        let mut history = self
            .platform()
            .iterate_messages(&entity.peer, CORRELATION_WINDOW)
            .take(CORRELATION_WINDOW);

        let mut scanned_count = 0;
        while let Some(item) = history.next().await {
            let msg = item.map_err(|e| FetchError::transport("scanning history", e))?;
            scanned_count += 1;

            let fetched = inspect(&msg);
            if matches_short_id(&fetched, short_id) {
                log::debug!(
                    "Correlated {} -> {} after {} messages",
                    short_id,
                    fetched.id,
                    scanned_count
                );
                return Ok(CorrelationResult::Found {
                    full_id: fetched.id,
                    timestamp_utc: fetched.timestamp_utc,
                });
            }
        }

        Ok(CorrelationResult::NotFound { scanned_count })
    }
}

fn matches_short_id(msg: &FetchedMessage, short_id: i64) -> bool {
    msg.id == short_id || msg.reply_to_id == Some(short_id)
}
