use crate::communication::feed::{Feed, FeedError, FeedEvent, FeedSink, Result, SubscriptionHandle};
use crate::communication::messages::decode_payload;
use crate::shared_data::TrafficSnapshot;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryFeedState {
    next_handle: u64,
    subscribers: HashMap<SubscriptionHandle, (String, FeedSink)>,
    refuse_subscriptions: bool,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
}

/// In-process feed. Clones share the same subscriber table, so a test can
/// hand one clone to a reconciler and drive it with another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    state: Arc<Mutex<MemoryFeedState>>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// A feed whose `subscribe` always fails, as if the backend were unreachable.
    pub fn unreachable() -> Self {
        let feed = Self::new();
        feed.lock().refuse_subscriptions = true;
        feed
    }

    fn lock(&self) -> MutexGuard<'_, MemoryFeedState> {
        // A panicking test thread must not wedge every other clone.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Delivers `event` to every live subscriber of `channel`; returns how
    /// many received it. Subscribers whose queue is gone are dropped.
    pub fn emit(&self, channel: &str, event: FeedEvent) -> usize {
        let mut state = self.lock();
        let mut delivered = 0;
        state.subscribers.retain(|_, (name, sink)| {
            if name != channel {
                return true;
            }
            match sink.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        delivered
    }

    pub fn publish(&self, channel: &str, snapshot: TrafficSnapshot) -> usize {
        self.emit(channel, FeedEvent::Message(Some(snapshot)))
    }

    pub fn publish_empty(&self, channel: &str) -> usize {
        self.emit(channel, FeedEvent::Message(None))
    }

    /// Runs a raw body through the same decoding the AMQP feed uses.
    pub fn publish_raw(&self, channel: &str, body: &[u8]) -> usize {
        self.emit(channel, decode_payload(body))
    }

    pub fn fail(&self, channel: &str, reason: &str) -> usize {
        self.emit(channel, FeedEvent::Error(reason.to_string()))
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.lock()
            .subscribers
            .values()
            .filter(|(name, _)| name == channel)
            .count()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.lock().subscribe_calls
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.lock().unsubscribe_calls
    }
}

impl Feed for MemoryFeed {
    fn subscribe(&self, channel: &str, sink: FeedSink) -> Result<SubscriptionHandle> {
        let mut state = self.lock();
        state.subscribe_calls += 1;
        if state.refuse_subscriptions {
            return Err(FeedError::Subscribe(
                channel.to_string(),
                "feed unreachable".to_string(),
            ));
        }
        state.next_handle += 1;
        let handle = SubscriptionHandle(state.next_handle);
        state
            .subscribers
            .insert(handle, (channel.to_string(), sink));
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()> {
        let mut state = self.lock();
        state.unsubscribe_calls += 1;
        state
            .subscribers
            .remove(&handle)
            .map(|_| ())
            .ok_or(FeedError::UnknownSubscription(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn events_reach_only_the_named_channel() {
        let feed = MemoryFeed::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (other_tx, mut other_rx) = mpsc::unbounded_channel();
        feed.subscribe("traffic", tx).unwrap();
        feed.subscribe("weather", other_tx).unwrap();

        assert_eq!(feed.publish_empty("traffic"), 1);
        assert_eq!(rx.try_recv().unwrap(), FeedEvent::Message(None));
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn unsubscribe_removes_the_handler_once() {
        let feed = MemoryFeed::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = feed.subscribe("traffic", tx).unwrap();
        assert_eq!(feed.subscriber_count("traffic"), 1);

        feed.unsubscribe(handle).unwrap();
        assert_eq!(feed.subscriber_count("traffic"), 0);
        assert!(matches!(
            feed.unsubscribe(handle),
            Err(FeedError::UnknownSubscription(_))
        ));
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let feed = MemoryFeed::new();
        let (tx, rx) = mpsc::unbounded_channel();
        feed.subscribe("traffic", tx).unwrap();
        drop(rx);
        assert_eq!(feed.fail("traffic", "gone"), 0);
        assert_eq!(feed.subscriber_count("traffic"), 0);
    }

    #[test]
    fn unreachable_feed_refuses_subscriptions() {
        let feed = MemoryFeed::unreachable();
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(matches!(
            feed.subscribe("traffic", tx),
            Err(FeedError::Subscribe(..))
        ));
        assert_eq!(feed.subscribe_calls(), 1);
    }
}
