//! Best-effort side effects
//!
//! Presence updates, reactions, read receipts and most sends are fire-and-forget: a
//! failure is logged at warn level and never reaches the caller.

use std::future::Future;

use crate::application::errors::BotError;

/// Await `fut`, logging and discarding any error.
pub async fn best_effort<T, F>(step: &str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, BotError>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("{} failed (ignored): {}", step, e);
            None
        }
    }
}
