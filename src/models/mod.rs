pub mod color;
pub mod lane;

pub use color::Rgb;
pub use lane::{lane_config, LaneConfig, LaneId, Orientation, Side, LANE_CONFIGS};
