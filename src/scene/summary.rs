use crate::models::color::Rgb;
use crate::models::lane::{LaneConfig, LaneId};
use crate::monitoring::reconciler::FeedView;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneDetail {
    pub lane: LaneId,
    /// Display label, "Road-N".
    pub label: String,
    /// Compass name of the approach.
    pub name: &'static str,
    pub color: Rgb,
    pub vehicles: usize,
    pub emergency: bool,
}

/// Text-level digest of a view: the numbers a status panel shows next to
/// the intersection drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSummary {
    pub connected: bool,
    pub total_vehicles: u64,
    pub emergency_lanes: Vec<LaneId>,
    pub lanes: Vec<LaneDetail>,
}

impl TrafficSummary {
    pub fn from_view(view: &FeedView, lanes: &[LaneConfig]) -> Self {
        let snapshot = &view.snapshot;
        Self {
            connected: view.connected,
            total_vehicles: snapshot.total_vehicles(),
            emergency_lanes: snapshot.emergency_lanes().into_iter().collect(),
            lanes: lanes
                .iter()
                .map(|lane| LaneDetail {
                    lane: lane.id,
                    label: lane.label(),
                    name: lane.name,
                    color: lane.color,
                    vehicles: snapshot.count_for(lane.id),
                    emergency: snapshot.is_emergency(lane.id),
                })
                .collect(),
        }
    }

    pub fn status_text(&self) -> &'static str {
        if self.connected {
            "Connected"
        } else {
            "Disconnected"
        }
    }

    pub fn emergency_text(&self) -> String {
        if self.emergency_lanes.is_empty() {
            "None".to_string()
        } else {
            self.emergency_lanes
                .iter()
                .map(|lane| lane.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

impl fmt::Display for TrafficSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Smart Traffic Monitor [{}]", self.status_text())?;
        writeln!(f, "Total Vehicles: {}", self.total_vehicles)?;
        writeln!(f, "Emergency Lanes: {}", self.emergency_text())?;
        for detail in &self.lanes {
            write!(
                f,
                "  {} ({}): {}",
                detail.label, detail.name, detail.vehicles
            )?;
            if detail.emergency {
                write!(f, " EMERGENCY")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
