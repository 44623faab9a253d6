//! Owner notification channel.
//!
//! Notifications are fire-and-forget: implementations log and swallow
//! delivery failures, so `notify` has no error type.
//!
//! `BoxNotifier` follows the same blanket-impl pattern as `BoxLlmProvider`
//! so the concrete channel (SMS or log-only) can be picked at startup.

use std::future::Future;
use std::pin::Pin;

use tracing::info;

pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn notify(&self, message: &str) -> impl Future<Output = ()> + Send;
}

/// Object-safe version of [`Notifier`] with boxed futures.
pub trait NotifierDyn: Send + Sync {
    fn name(&self) -> &str;

    fn notify_boxed<'a>(&'a self, message: &'a str) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

impl<T: Notifier> NotifierDyn for T {
    fn name(&self) -> &str {
        Notifier::name(self)
    }

    fn notify_boxed<'a>(&'a self, message: &'a str) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.notify(message))
    }
}

/// Type-erased notifier for runtime channel selection.
pub struct BoxNotifier {
    inner: Box<dyn NotifierDyn + Send + Sync>,
}

impl BoxNotifier {
    pub fn new<T: Notifier + 'static>(notifier: T) -> Self {
        Self {
            inner: Box::new(notifier),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn notify(&self, message: &str) {
        self.inner.notify_boxed(message).await
    }
}

/// Used when no delivery channel is configured: the alert only reaches the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, message: &str) {
        info!(notifier = "log", %message, "Owner notification (no delivery channel configured)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNotifier;

    #[tokio::test]
    async fn test_box_notifier_delegates() {
        let recording = RecordingNotifier::default();
        let boxed = BoxNotifier::new(recording.clone());

        boxed.notify("trust dropped").await;

        assert_eq!(boxed.name(), "recording");
        assert_eq!(*recording.sent.lock().unwrap(), vec!["trust dropped".to_string()]);
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        BoxNotifier::new(LogNotifier).notify("hello").await;
    }
}
