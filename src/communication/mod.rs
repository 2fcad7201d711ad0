pub mod amqp_feed;
pub mod feed;
pub mod memory_feed;
pub mod messages;

pub use amqp_feed::{AmqpFeed, SnapshotPublisher};
pub use feed::{Feed, FeedError, FeedEvent, FeedSink, SubscriptionHandle};
pub use memory_feed::MemoryFeed;
pub use messages::{decode_payload, encode_payload};
