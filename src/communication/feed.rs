use crate::shared_data::TrafficSnapshot;
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// What a feed pushes to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A whole snapshot, or `None` when the feed reports that it has no data.
    Message(Option<TrafficSnapshot>),
    /// The feed failed (connection lost, undecodable delivery, consumer ended).
    Error(String),
}

/// Single-consumer queue a feed delivers events into.
pub type FeedSink = UnboundedSender<FeedEvent>;

/// Opaque token returned by [`Feed::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(pub u64);

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("AMQP error: {0}")]
    Connection(#[from] amiquip::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Subscription to '{0}' failed: {1}")]
    Subscribe(String, String),

    #[error("Unknown subscription {0}")]
    UnknownSubscription(SubscriptionHandle),

    #[error("Feed closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, FeedError>;

/// A realtime source of traffic snapshots.
///
/// Implementations push [`FeedEvent`]s for the named channel into `sink`
/// until [`Feed::unsubscribe`] is called with the returned handle. Any
/// reconnection policy lives behind this trait.
pub trait Feed {
    fn subscribe(&self, channel: &str, sink: FeedSink) -> Result<SubscriptionHandle>;

    fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()>;
}

impl<F: Feed + ?Sized> Feed for std::sync::Arc<F> {
    fn subscribe(&self, channel: &str, sink: FeedSink) -> Result<SubscriptionHandle> {
        (**self).subscribe(channel, sink)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()> {
        (**self).unsubscribe(handle)
    }
}
