pub mod builder;
pub mod layout;
pub mod primitives;
pub mod summary;

pub use builder::{build_scene, build_scene_with, MAX_LANE_MARKERS};
pub use layout::LayoutMetrics;
pub use primitives::{CanvasSize, Glow, Label, LaneMarkers, Marker, RectPrimitive, Scene, Stroke};
pub use summary::{LaneDetail, TrafficSummary};
