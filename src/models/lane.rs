use crate::models::color::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one of the four approaches to the intersection
/// (1 = North, 2 = East, 3 = South, 4 = West).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LaneId(u8);

impl LaneId {
    pub const NORTH: LaneId = LaneId(1);
    pub const EAST: LaneId = LaneId(2);
    pub const SOUTH: LaneId = LaneId(3);
    pub const WEST: LaneId = LaneId(4);

    /// Returns `None` for anything outside 1..=4.
    pub fn new(raw: i64) -> Option<Self> {
        match raw {
            1..=4 => Some(LaneId(raw as u8)),
            _ => None,
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// The key used for this lane in `lane_vehicle_counts` ("1".."4").
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis along which vehicles queue on a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Side of the intersection a lane approaches from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Sign of the step that moves away from the intersection centre
    /// along the lane axis (screen coordinates, y grows downward).
    pub fn outward_sign(&self) -> f64 {
        match self {
            Side::Top | Side::Left => -1.0,
            Side::Right | Side::Bottom => 1.0,
        }
    }

    /// Which half of the road the approach lane sits on, relative to the
    /// centre line.
    pub fn lane_offset_sign(&self) -> f64 {
        match self {
            Side::Top | Side::Right => -1.0,
            Side::Bottom | Side::Left => 1.0,
        }
    }
}

/// Static description of one approach lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaneConfig {
    pub id: LaneId,
    /// Compass name of the approach.
    pub name: &'static str,
    /// Base colour for the lane's markers and label.
    pub color: Rgb,
    pub orientation: Orientation,
    pub side: Side,
}

impl LaneConfig {
    /// Text shown next to the lane on the rendered intersection.
    pub fn label(&self) -> String {
        format!("Road-{}", self.id)
    }
}

/// The four approaches, in lane-id order. Never mutated.
pub const LANE_CONFIGS: [LaneConfig; 4] = [
    LaneConfig {
        id: LaneId::NORTH,
        name: "North",
        color: Rgb::new(0x63, 0x66, 0xf1),
        orientation: Orientation::Vertical,
        side: Side::Top,
    },
    LaneConfig {
        id: LaneId::EAST,
        name: "East",
        color: Rgb::new(0xa8, 0x55, 0xf7),
        orientation: Orientation::Horizontal,
        side: Side::Right,
    },
    LaneConfig {
        id: LaneId::SOUTH,
        name: "South",
        color: Rgb::new(0xf5, 0x9e, 0x0b),
        orientation: Orientation::Vertical,
        side: Side::Bottom,
    },
    LaneConfig {
        id: LaneId::WEST,
        name: "West",
        color: Rgb::new(0x10, 0xb9, 0x81),
        orientation: Orientation::Horizontal,
        side: Side::Left,
    },
];

pub fn lane_config(id: LaneId) -> &'static LaneConfig {
    &LANE_CONFIGS[(id.get() - 1) as usize]
}
