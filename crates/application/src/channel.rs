//! Per-session result delivery.
//!
//! Every session owns a [`ResultChannel`]: a broadcast sender that stream
//! observers subscribe to, plus a listener slot for callback-style
//! observers. Background tasks hold clones of the channel and emit through
//! it when an attempt resolves.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use unilogin_domain::{LoginResult, ProviderType};

/// Callback-style result observer.
pub trait LoginListener: Send + Sync {
    /// Called once per emitted result.
    fn on_result(&self, result: &LoginResult);
}

impl<F> LoginListener for F
where
    F: Fn(&LoginResult) + Send + Sync,
{
    fn on_result(&self, result: &LoginResult) {
        self(result);
    }
}

/// A listener shared by every session channel.
pub type SharedListener = Arc<dyn LoginListener>;

/// Result channel of one session.
#[derive(Clone)]
pub struct ResultChannel {
    provider: ProviderType,
    sender: broadcast::Sender<LoginResult>,
    listener: Arc<RwLock<Option<SharedListener>>>,
}

impl ResultChannel {
    /// Results buffered per subscriber before it starts lagging.
    pub const CAPACITY: usize = 16;

    /// Creates a channel for a provider.
    #[must_use]
    pub fn new(provider: ProviderType) -> Self {
        let (sender, _) = broadcast::channel(Self::CAPACITY);
        Self {
            provider,
            sender,
            listener: Arc::new(RwLock::new(None)),
        }
    }

    /// Provider whose results travel on this channel.
    #[must_use]
    pub const fn provider(&self) -> ProviderType {
        self.provider
    }

    /// Subscribes to results emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LoginResult> {
        self.sender.subscribe()
    }

    /// Replaces (or clears) the listener.
    pub fn set_listener(&self, listener: Option<SharedListener>) {
        *self.listener.write() = listener;
    }

    /// Returns true if a listener is attached.
    #[must_use]
    pub fn has_listener(&self) -> bool {
        self.listener.read().is_some()
    }

    /// Number of live stream subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Delivers a result to the listener and every subscriber.
    ///
    /// Returns the number of stream subscribers that received it.
    pub fn emit(&self, result: LoginResult) -> usize {
        // Clone out of the lock so the listener may reattach itself.
        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            listener.on_result(&result);
        }

        let attempt_id = result.attempt_id.clone();
        match self.sender.send(result) {
            Ok(receivers) => {
                trace!(provider = %self.provider, %attempt_id, receivers, "result emitted");
                receivers
            }
            Err(_) => {
                debug!(provider = %self.provider, %attempt_id, "result emitted with no stream subscribers");
                0
            }
        }
    }
}

impl fmt::Debug for ResultChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultChannel")
            .field("provider", &self.provider)
            .field("subscribers", &self.sender.receiver_count())
            .field("has_listener", &self.has_listener())
            .finish()
    }
}

/// Background work of the current attempt.
///
/// Tracking a new task aborts the previous one. Dropping the tracker aborts
/// the tracked task.
#[derive(Debug, Default)]
pub struct InFlightTask {
    handle: Option<JoinHandle<()>>,
}

impl InFlightTask {
    /// Creates an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Tracks a task, aborting the one tracked before.
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.handle = Some(handle);
    }

    /// Aborts the tracked task.
    ///
    /// Returns true if a task was still running.
    pub fn cancel(&mut self) -> bool {
        self.handle.take().is_some_and(|handle| {
            let running = !handle.is_finished();
            handle.abort();
            running
        })
    }

    /// Returns true while the tracked task has not finished.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for InFlightTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use unilogin_domain::{ProviderError, UserProfile};

    #[test]
    fn test_emit_reaches_listener_and_subscribers() {
        let channel = ResultChannel::new(ProviderType::Github);
        assert_eq!(channel.subscriber_count(), 0);
        let mut rx = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 1);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        channel.set_listener(Some(Arc::new(move |_: &LoginResult| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        let result = LoginResult::succeeded(ProviderType::Github, UserProfile::new("7"));
        assert_eq!(channel.emit(result.clone()), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(rx.try_recv().unwrap(), result);
    }

    #[test]
    fn test_emit_without_observers_is_harmless() {
        let channel = ResultChannel::new(ProviderType::Line);
        let sent = channel.emit(LoginResult::failed(
            ProviderType::Line,
            ProviderError::MissingToken,
        ));
        assert_eq!(sent, 0);
    }

    #[test]
    fn test_listener_is_shared_between_clones() {
        let channel = ResultChannel::new(ProviderType::Kakao);
        let clone = channel.clone();
        channel.set_listener(Some(Arc::new(|_: &LoginResult| {})));
        assert!(clone.has_listener());
        clone.set_listener(None);
        assert!(!channel.has_listener());
    }

    #[tokio::test]
    async fn test_in_flight_task_cancel() {
        let mut task = InFlightTask::new();
        assert!(!task.cancel());

        task.track(tokio::spawn(std::future::pending::<()>()));
        assert!(task.is_running());
        assert!(task.cancel());
        assert!(!task.is_running());
    }

    #[tokio::test]
    async fn test_tracking_aborts_previous_task() {
        let mut task = InFlightTask::new();
        let first = tokio::spawn(std::future::pending::<()>());
        let first_abort = first.abort_handle();
        task.track(first);
        task.track(tokio::spawn(std::future::pending::<()>()));

        for _ in 0..10 {
            if first_abort.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(first_abort.is_finished());
        assert!(task.is_running());
    }
}
