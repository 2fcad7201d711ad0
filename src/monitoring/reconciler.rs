use crate::communication::feed::{Feed, FeedError, FeedEvent, SubscriptionHandle};
use crate::shared_data::TrafficSnapshot;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tokio::sync::watch;

/// Everything the presentation side may read: the last good snapshot and
/// whether the most recent feed message carried data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedView {
    pub snapshot: TrafficSnapshot,
    pub connected: bool,
}

#[derive(Error, Debug)]
pub enum ReconcilerError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

struct ActiveSubscription {
    handle: SubscriptionHandle,
    events: UnboundedReceiver<FeedEvent>,
}

/// Holds the current traffic snapshot and connectivity flag, fed by a
/// single subscription on an injected [`Feed`].
///
/// The view is published through a `watch` channel: every update swaps in
/// a complete [`FeedView`], so readers never observe a half-applied one.
pub struct Reconciler<F: Feed> {
    feed: F,
    channel: String,
    subscription: Option<ActiveSubscription>,
    view: watch::Sender<FeedView>,
}

impl<F: Feed> Reconciler<F> {
    /// Starts out with the all-zero snapshot, disconnected.
    pub fn new(feed: F, channel: impl Into<String>) -> Self {
        let (view, _) = watch::channel(FeedView::default());
        Self {
            feed,
            channel: channel.into(),
            subscription: None,
            view,
        }
    }

    pub fn is_started(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribes to the channel. Calling it again while subscribed is
    /// logged and ignored. A failed subscription is returned to the caller
    /// and leaves the default, disconnected view in place.
    pub fn start(&mut self) -> Result<(), ReconcilerError> {
        if let Some(active) = &self.subscription {
            log::warn!(
                "Reconciler already subscribed to '{}' ({}); ignoring start",
                self.channel,
                active.handle
            );
            return Ok(());
        }
        let (sink, events) = mpsc::unbounded_channel();
        let handle = self.feed.subscribe(&self.channel, sink).map_err(|e| {
            log::error!("Could not subscribe to '{}': {}", self.channel, e);
            e
        })?;
        log::info!("Reconciler subscribed to '{}' ({})", self.channel, handle);
        self.subscription = Some(ActiveSubscription { handle, events });
        Ok(())
    }

    /// Releases the subscription. Safe to call any number of times; only
    /// the first call after a `start` reaches the feed.
    pub fn stop(&mut self) {
        if let Some(active) = self.subscription.take() {
            match self.feed.unsubscribe(active.handle) {
                Ok(()) => log::info!("Reconciler unsubscribed from '{}'", self.channel),
                Err(e) => log::warn!("Unsubscribe from '{}' failed: {}", self.channel, e),
            }
        }
    }

    /// Applies one feed event. Returns whether the published view changed.
    pub fn apply(&self, event: FeedEvent) -> bool {
        match event {
            FeedEvent::Message(Some(snapshot)) => {
                log::debug!("Snapshot replaced: {:?}", snapshot);
                self.view.send_if_modified(|view| {
                    let next = FeedView {
                        snapshot,
                        connected: true,
                    };
                    if *view == next {
                        return false;
                    }
                    *view = next;
                    true
                })
            }
            FeedEvent::Message(None) => self.mark_disconnected("feed reported no data"),
            FeedEvent::Error(reason) => self.mark_disconnected(&reason),
        }
    }

    fn mark_disconnected(&self, reason: &str) -> bool {
        self.view.send_if_modified(|view| {
            if !view.connected {
                return false;
            }
            log::warn!("Traffic feed '{}' disconnected: {}", self.channel, reason);
            view.connected = false;
            true
        })
    }

    /// Applies every event already queued, in arrival order. Returns how
    /// many were processed.
    pub fn drain(&mut self) -> usize {
        let mut processed = 0;
        loop {
            let next = match self.subscription.as_mut() {
                Some(active) => active.events.try_recv(),
                None => return processed,
            };
            match next {
                Ok(event) => {
                    self.apply(event);
                    processed += 1;
                }
                Err(TryRecvError::Empty) => return processed,
                Err(TryRecvError::Disconnected) => {
                    self.on_feed_closed();
                    return processed;
                }
            }
        }
    }

    /// Applies events as they arrive until the feed closes its side of the
    /// queue. Returns immediately when not started.
    pub async fn run(&mut self) {
        loop {
            let next = match self.subscription.as_mut() {
                Some(active) => active.events.recv().await,
                None => return,
            };
            match next {
                Some(event) => {
                    self.apply(event);
                }
                None => {
                    self.on_feed_closed();
                    return;
                }
            }
        }
    }

    fn on_feed_closed(&mut self) {
        self.mark_disconnected("feed closed");
        self.stop();
    }

    /// A copy of the current view.
    pub fn view(&self) -> FeedView {
        self.view.borrow().clone()
    }

    pub fn snapshot(&self) -> TrafficSnapshot {
        self.view.borrow().snapshot.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.view.borrow().connected
    }

    /// A receiver that is notified on every view change, for render loops
    /// running on other tasks.
    pub fn subscribe_view(&self) -> watch::Receiver<FeedView> {
        self.view.subscribe()
    }
}

impl<F: Feed> Drop for Reconciler<F> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::memory_feed::MemoryFeed;
    use crate::models::lane::LaneId;
    use std::collections::BTreeMap;

    fn snapshot(counts: [i64; 4], emergency: &[i64]) -> TrafficSnapshot {
        TrafficSnapshot {
            vehicle_count: counts.iter().sum(),
            emergency_lane: emergency.to_vec(),
            lane_vehicle_counts: counts
                .iter()
                .enumerate()
                .map(|(i, &c)| ((i + 1).to_string(), c))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn starts_disconnected_with_zero_snapshot() {
        let reconciler = Reconciler::new(MemoryFeed::new(), "traffic");
        let view = reconciler.view();
        assert!(!view.connected);
        assert_eq!(view.snapshot, TrafficSnapshot::default());
    }

    #[test]
    fn double_start_subscribes_once() {
        let feed = MemoryFeed::new();
        let mut reconciler = Reconciler::new(feed.clone(), "traffic");
        reconciler.start().unwrap();
        reconciler.start().unwrap();
        assert_eq!(feed.subscribe_calls(), 1);
        assert_eq!(feed.subscriber_count("traffic"), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let feed = MemoryFeed::new();
        let mut reconciler = Reconciler::new(feed.clone(), "traffic");
        reconciler.start().unwrap();
        reconciler.stop();
        reconciler.stop();
        assert_eq!(feed.unsubscribe_calls(), 1);
        assert_eq!(feed.subscriber_count("traffic"), 0);
    }

    #[test]
    fn drop_releases_the_subscription() {
        let feed = MemoryFeed::new();
        {
            let mut reconciler = Reconciler::new(feed.clone(), "traffic");
            reconciler.start().unwrap();
            assert_eq!(feed.subscriber_count("traffic"), 1);
        }
        assert_eq!(feed.subscriber_count("traffic"), 0);
        assert_eq!(feed.unsubscribe_calls(), 1);
    }

    #[test]
    fn failed_start_leaves_default_view() {
        let mut reconciler = Reconciler::new(MemoryFeed::unreachable(), "traffic");
        assert!(reconciler.start().is_err());
        assert!(!reconciler.is_started());
        assert_eq!(reconciler.view(), FeedView::default());
    }

    #[test]
    fn repeated_disconnects_notify_once() {
        let reconciler = Reconciler::new(MemoryFeed::new(), "traffic");
        assert!(reconciler.apply(FeedEvent::Message(Some(snapshot([1, 0, 0, 0], &[])))));
        assert!(reconciler.apply(FeedEvent::Message(None)));
        assert!(!reconciler.apply(FeedEvent::Error("timeout".to_string())));
        assert!(!reconciler.is_connected());
        assert_eq!(reconciler.snapshot().count_for(LaneId::NORTH), 1);
    }

    #[test]
    fn drain_applies_in_arrival_order() {
        let feed = MemoryFeed::new();
        let mut reconciler = Reconciler::new(feed.clone(), "traffic");
        reconciler.start().unwrap();
        feed.publish("traffic", snapshot([1, 0, 0, 0], &[]));
        feed.publish("traffic", snapshot([0, 4, 0, 0], &[2]));
        assert_eq!(reconciler.drain(), 2);

        let view = reconciler.view();
        assert!(view.connected);
        assert_eq!(view.snapshot.count_for(LaneId::NORTH), 0);
        assert_eq!(view.snapshot.count_for(LaneId::EAST), 4);
        assert_eq!(reconciler.drain(), 0);
    }

    #[test]
    fn events_after_stop_are_not_applied() {
        let feed = MemoryFeed::new();
        let mut reconciler = Reconciler::new(feed.clone(), "traffic");
        reconciler.start().unwrap();
        reconciler.stop();
        assert_eq!(feed.publish("traffic", snapshot([3, 0, 0, 0], &[])), 0);
        assert_eq!(reconciler.drain(), 0);
        assert!(!reconciler.is_connected());
    }
}
