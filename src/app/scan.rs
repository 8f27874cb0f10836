use crate::app::{inspect, App};
use crate::error::FetchError;
use crate::model::{MediaDescriptor, ResolvedChat};
use crate::platform::Platform;
use futures::future;
use futures::stream::{BoxStream, StreamExt};

pub const SCAN_LIMIT_MIN: usize = 1;
pub const SCAN_LIMIT_MAX: usize = 200;

/// A resolved chat plus a one-shot stream over its recent media.
pub struct RecentMedia {
    pub chat: ResolvedChat,
    /// Most recent first. Ends after the scan bound or the first error.
    pub items: BoxStream<'static, Result<MediaDescriptor, FetchError>>,
}

pub fn check_limit(limit: i64) -> Result<usize, FetchError> {
    usize::try_from(limit)
        .ok()
        .filter(|l| (SCAN_LIMIT_MIN..=SCAN_LIMIT_MAX).contains(l))
        .ok_or(FetchError::InvalidLimit {
            limit,
            min: SCAN_LIMIT_MIN,
            max: SCAN_LIMIT_MAX,
        })
}

impl<P: Platform> App<P> {
    /// Inspect at most `limit` of the newest messages and describe the ones
    /// that carry media. Messages without media still count against `limit`.
    pub async fn scan_recent_media(
        &self,
        reference: Option<&str>,
        peer_override: Option<&str>,
        limit: i64,
    ) -> Result<RecentMedia, FetchError> {
        let limit = check_limit(limit)?;
        let entity = self.resolve_entity(reference, peer_override).await?;

        let items = self
            .platform()
            .iterate_messages(&entity.peer, limit)
            .take(limit)
            .scan(false, |failed, item| {
                if *failed {
                    return future::ready(None);
                }
                *failed = item.is_err();
                future::ready(Some(item))
            })
            .filter_map(|item| {
                future::ready(match item {
                    Ok(msg) => {
                        let fetched = inspect(&msg);
                        fetched
                            .has_media
                            .then(|| Ok(MediaDescriptor::from_message(&fetched)))
                    }
                    Err(e) => Some(Err(FetchError::transport("listing messages", e))),
                })
            })
            .boxed();

        Ok(RecentMedia {
            chat: entity.record.to_resolved(),
            items,
        })
    }
}
