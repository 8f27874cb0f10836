use crate::app::App;
use crate::error::FetchError;
use crate::model::ResolvedChat;
use crate::platform::{Entity, Platform, PlatformError};
use crate::target::{normalize, ChatReference};

/// Pick the reference to resolve. A non-blank override replaces the
/// primary reference entirely.
pub fn pick_target(reference: Option<&str>, peer_override: Option<&str>) -> ChatReference {
    match normalize(peer_override) {
        ChatReference::Invalid => normalize(reference),
        target => target,
    }
}

impl<P: Platform> App<P> {
    pub async fn resolve(
        &self,
        reference: Option<&str>,
        peer_override: Option<&str>,
    ) -> Result<ResolvedChat, FetchError> {
        let entity = self.resolve_entity(reference, peer_override).await?;
        Ok(entity.record.to_resolved())
    }

    /// One platform lookup per call; nothing is cached.
    pub(crate) async fn resolve_entity(
        &self,
        reference: Option<&str>,
        peer_override: Option<&str>,
    ) -> Result<Entity<P::Peer>, FetchError> {
        let target = pick_target(reference, peer_override);
        if target.is_invalid() {
            return Err(FetchError::MissingTarget);
        }

        log::debug!("Resolving chat {}", target);
        self.platform()
            .resolve_entity(&target)
            .await
            .map_err(|e| match e {
                PlatformError::NotFound(detail) => FetchError::NotFound {
                    reference: target.to_string(),
                    detail,
                },
                PlatformError::Transport(message) => FetchError::Transport {
                    operation: "resolving chat",
                    message,
                },
            })
    }
}
