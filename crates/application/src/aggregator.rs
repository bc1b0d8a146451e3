//! Result aggregation
//!
//! Merges the result channels of every live session into one stream and
//! one listener surface. Each observer stream is handed a freshly merged
//! set on every rebind, so observers survive session rebuilds.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{self, SelectAll, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};
use unilogin_domain::LoginResult;

use crate::channel::{ResultChannel, SharedListener};

type Merged = SelectAll<BroadcastStream<LoginResult>>;

/// Merges session results.
pub struct ResultAggregator {
    channels: Vec<ResultChannel>,
    observers: Vec<mpsc::UnboundedSender<Merged>>,
    listener: Option<SharedListener>,
}

impl ResultAggregator {
    /// Creates an aggregator over no sessions.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            channels: Vec::new(),
            observers: Vec::new(),
            listener: None,
        }
    }

    /// Replaces the channel set after a rebuild.
    ///
    /// The remembered listener, if any, is attached to the new channels.
    /// Every open stream is subscribed to the new set before this returns
    /// and drops whatever the replaced channels still had queued.
    pub fn rebind(&mut self, channels: Vec<ResultChannel>) {
        if let Some(listener) = &self.listener {
            for channel in &channels {
                channel.set_listener(Some(Arc::clone(listener)));
            }
        }
        self.observers
            .retain(|observer| observer.send(merge(&channels)).is_ok());
        debug!(
            channels = channels.len(),
            observers = self.observers.len(),
            "result channels rebound"
        );
        self.channels = channels;
    }

    /// Attaches `listener` to every current channel, replacing any previous
    /// listener. It also sticks to channels published by later rebinds.
    pub fn attach_listener(&mut self, listener: SharedListener) {
        for channel in &self.channels {
            channel.set_listener(Some(Arc::clone(&listener)));
        }
        self.listener = Some(listener);
    }

    /// Removes the listener from every current channel.
    pub fn detach_listener(&mut self) {
        for channel in &self.channels {
            channel.set_listener(None);
        }
        self.listener = None;
    }

    /// Returns true if a listener is attached.
    #[must_use]
    pub const fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Number of channels currently merged.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Opens a merged stream over every session's results.
    ///
    /// Subscription happens here, not on first poll: no result emitted after
    /// this call is missed. The stream ends when the aggregator is dropped.
    pub fn observe(&mut self) -> ResultStream {
        let (handoff_tx, handoff) = mpsc::unbounded_channel();
        let merged = merge(&self.channels);
        self.observers.push(handoff_tx);

        let inner = stream::unfold((handoff, merged), |(mut handoff, mut merged)| async move {
            loop {
                tokio::select! {
                    biased;
                    // A closed handoff means the aggregator is gone.
                    rebound = handoff.recv() => merged = rebound?,
                    item = merged.next(), if !merged.is_empty() => match item {
                        Some(Ok(result)) => return Some((result, (handoff, merged))),
                        Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                            warn!(skipped, "result observer lagged; results dropped");
                        }
                        None => merged = SelectAll::new(),
                    },
                }
            }
        });

        ResultStream {
            inner: Box::pin(inner),
        }
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResultAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultAggregator")
            .field("channels", &self.channels.len())
            .field("observers", &self.observers.len())
            .field("has_listener", &self.has_listener())
            .finish()
    }
}

fn merge(channels: &[ResultChannel]) -> Merged {
    stream::select_all(
        channels
            .iter()
            .map(|channel| BroadcastStream::new(channel.subscribe())),
    )
}

/// Merged stream of login results from every session.
pub struct ResultStream {
    inner: Pin<Box<dyn Stream<Item = LoginResult> + Send>>,
}

impl Stream for ResultStream {
    type Item = LoginResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for ResultStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultStream").finish_non_exhaustive()
    }
}
