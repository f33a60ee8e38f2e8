//! One-shot flash messages.
//!
//! A handler queues a message before redirecting; the next page that renders
//! takes the queue, which empties it.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Severity of a flash message, used as its CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

/// Extractor giving access to the session's flash queue.
#[derive(Clone)]
pub struct Flash {
    session: Session,
}

impl Flash {
    /// Queue a message for the next rendered page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn push(
        &self,
        level: FlashLevel,
        text: impl Into<String>,
    ) -> Result<(), tower_sessions::session::Error> {
        let mut queue: Vec<FlashMessage> = self
            .session
            .get(session_keys::FLASH_MESSAGES)
            .await?
            .unwrap_or_default();
        queue.push(FlashMessage {
            level,
            text: text.into(),
        });
        self.session.insert(session_keys::FLASH_MESSAGES, queue).await
    }

    /// Take every queued message, leaving the queue empty.
    ///
    /// A session read failure yields no messages.
    pub async fn take(&self) -> Vec<FlashMessage> {
        match self
            .session
            .remove::<Vec<FlashMessage>>(session_keys::FLASH_MESSAGES)
            .await
        {
            Ok(messages) => messages.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read flash messages");
                Vec::new()
            }
        }
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "session layer missing",
        ))?;

        Ok(Self { session })
    }
}
