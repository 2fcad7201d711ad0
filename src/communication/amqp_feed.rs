use crate::communication::feed::{Feed, FeedError, FeedEvent, FeedSink, Result, SubscriptionHandle};
use crate::communication::messages::{decode_payload, encode_payload};
use crate::shared_data::TrafficSnapshot;
use amiquip::{
    Channel, Connection, ConsumerMessage, ConsumerOptions, Exchange, Publish, QueueDeclareOptions,
    Result as AmiquipResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// How long a consumer blocks on the queue before re-checking its stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

struct ConsumerWorker {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Feed backed by a RabbitMQ queue per channel name. Each subscription runs
/// its own blocking consumer thread that decodes deliveries into
/// [`FeedEvent`]s. The broker connection is not retried here; a lost
/// connection is reported once as `FeedEvent::Error`.
pub struct AmqpFeed {
    url: String,
    next_handle: AtomicU64,
    workers: Mutex<HashMap<SubscriptionHandle, ConsumerWorker>>,
}

impl AmqpFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            next_handle: AtomicU64::new(1),
            workers: Mutex::new(HashMap::new()),
        }
    }

    fn stop_worker(handle: SubscriptionHandle, worker: ConsumerWorker) {
        worker.stop.store(true, Ordering::Release);
        if worker.thread.join().is_err() {
            log::error!("AMQP consumer thread for subscription {} panicked", handle);
        }
    }
}

impl Feed for AmqpFeed {
    fn subscribe(&self, channel: &str, sink: FeedSink) -> Result<SubscriptionHandle> {
        let (ready_tx, ready_rx) = sync_channel(1);
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let url = self.url.clone();
        let queue_name = channel.to_string();

        let thread = thread::Builder::new()
            .name(format!("amqp-feed-{}", channel))
            .spawn(move || {
                if let Err(e) = consume_queue(&url, &queue_name, &sink, &worker_stop, &ready_tx) {
                    log::error!("AMQP consumer on '{}' failed: {}", queue_name, e);
                    // Whichever side is still listening gets told.
                    let _ = ready_tx.send(Err(e.to_string()));
                    let _ = sink.send(FeedEvent::Error(e.to_string()));
                }
            })
            .map_err(|e| FeedError::Subscribe(channel.to_string(), e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                let handle = SubscriptionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
                let mut workers = self.workers.lock().map_err(|_| FeedError::Closed)?;
                workers.insert(handle, ConsumerWorker { stop, thread });
                log::info!("Subscribed to '{}' as {}", channel, handle);
                Ok(handle)
            }
            Ok(Err(reason)) => {
                let _ = thread.join();
                Err(FeedError::Subscribe(channel.to_string(), reason))
            }
            Err(_) => {
                let _ = thread.join();
                Err(FeedError::Subscribe(
                    channel.to_string(),
                    "consumer exited before it was ready".to_string(),
                ))
            }
        }
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()> {
        let worker = self
            .workers
            .lock()
            .map_err(|_| FeedError::Closed)?
            .remove(&handle)
            .ok_or(FeedError::UnknownSubscription(handle))?;
        Self::stop_worker(handle, worker);
        log::info!("Unsubscribed {}", handle);
        Ok(())
    }
}

impl Drop for AmqpFeed {
    fn drop(&mut self) {
        let workers = match self.workers.get_mut() {
            Ok(workers) => std::mem::take(workers),
            Err(poisoned) => std::mem::take(poisoned.into_inner()),
        };
        for (handle, worker) in workers {
            Self::stop_worker(handle, worker);
        }
    }
}

/// Consumes `queue_name` until `stop` is raised, the subscriber goes away,
/// or the broker ends the consumer.
fn consume_queue(
    url: &str,
    queue_name: &str,
    sink: &FeedSink,
    stop: &AtomicBool,
    ready: &SyncSender<std::result::Result<(), String>>,
) -> AmiquipResult<()> {
    let mut connection = Connection::insecure_open(url)?;
    let channel = connection.open_channel(None)?;
    let queue = channel.queue_declare(queue_name, QueueDeclareOptions::default())?;
    let consumer = queue.consume(ConsumerOptions::default())?;
    let _ = ready.send(Ok(()));
    log::info!("Listening for traffic snapshots on '{}'...", queue_name);

    while !stop.load(Ordering::Acquire) {
        match consumer.receiver().recv_timeout(POLL_INTERVAL) {
            Ok(ConsumerMessage::Delivery(delivery)) => {
                let event = decode_payload(&delivery.body);
                if let FeedEvent::Error(reason) = &event {
                    log::warn!("Delivery on '{}' rejected: {}", queue_name, reason);
                }
                consumer.ack(delivery)?;
                if sink.send(event).is_err() {
                    log::debug!("Subscriber for '{}' went away", queue_name);
                    break;
                }
            }
            Ok(other) => {
                log::warn!("Consumer on '{}' ended: {:?}", queue_name, other);
                let _ = sink.send(FeedEvent::Error(format!("consumer ended: {:?}", other)));
                return connection.close();
            }
            Err(e) if e.is_timeout() => continue,
            Err(_) => {
                let _ = sink.send(FeedEvent::Error("consumer disconnected".to_string()));
                return connection.close();
            }
        }
    }

    consumer.cancel()?;
    connection.close()
}

/// Publishes snapshots to a channel. Used by the simulator binary to stand
/// in for the real feed producer.
pub struct SnapshotPublisher {
    connection: Connection,
    channel: Channel,
    routing_key: String,
}

impl SnapshotPublisher {
    pub fn open(url: &str, routing_key: &str) -> Result<Self> {
        let mut connection = Connection::insecure_open(url)?;
        let channel = connection.open_channel(None)?;
        channel.queue_declare(routing_key, QueueDeclareOptions::default())?;
        Ok(Self {
            connection,
            channel,
            routing_key: routing_key.to_string(),
        })
    }

    /// `None` publishes the "no data" body.
    pub fn publish(&self, snapshot: Option<&TrafficSnapshot>) -> Result<()> {
        let body = encode_payload(snapshot)?;
        let exchange = Exchange::direct(&self.channel);
        exchange.publish(Publish::new(&body, self.routing_key.as_str()))?;
        Ok(())
    }

    pub fn close(self) -> Result<()> {
        self.connection.close()?;
        Ok(())
    }
}
