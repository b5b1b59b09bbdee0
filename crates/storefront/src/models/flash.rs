//! Toast messages carried across a redirect.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session::keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    /// CSS modifier for the toast.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    /// Queue a toast for the next rendered page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn push(
        session: &Session,
        kind: FlashKind,
        message: impl Into<String>,
    ) -> Result<(), tower_sessions::session::Error> {
        let mut queued: Vec<Self> = session.get(keys::FLASH).await?.unwrap_or_default();
        queued.push(Self {
            kind,
            message: message.into(),
        });
        session.insert(keys::FLASH, queued).await
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn success(
        session: &Session,
        message: impl Into<String>,
    ) -> Result<(), tower_sessions::session::Error> {
        Self::push(session, FlashKind::Success, message).await
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn error(
        session: &Session,
        message: impl Into<String>,
    ) -> Result<(), tower_sessions::session::Error> {
        Self::push(session, FlashKind::Error, message).await
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn info(
        session: &Session,
        message: impl Into<String>,
    ) -> Result<(), tower_sessions::session::Error> {
        Self::push(session, FlashKind::Info, message).await
    }

    /// Drain queued toasts. Each one is shown once.
    pub async fn take(session: &Session) -> Vec<Self> {
        match session.remove::<Vec<Self>>(keys::FLASH).await {
            Ok(queued) => queued.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read flash messages");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    #[tokio::test]
    async fn test_flash_shown_once_in_order() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        Flash::success(&session, "Address saved successfully!").await.ok();
        Flash::error(&session, "Coupon removed successfully").await.ok();

        let shown = Flash::take(&session).await;
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].kind, FlashKind::Success);
        assert_eq!(shown[1].kind.as_str(), "error");
        assert!(Flash::take(&session).await.is_empty());
    }
}
