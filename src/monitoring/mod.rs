pub mod reconciler;

pub use reconciler::{FeedView, Reconciler, ReconcilerError};
