// src/shared_data.rs

use crate::models::lane::{LaneId, LANE_CONFIGS};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One complete traffic reading as delivered by the feed.
///
/// Snapshots are replaced wholesale; a field missing from a payload, or sent
/// as `null`, takes its default here rather than keeping the previous value.
/// Counts are kept signed exactly as received and clamped when read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficSnapshot {
    /// Total reported by the feed. Informational; not tied to the lane counts.
    #[serde(deserialize_with = "null_as_default")]
    pub vehicle_count: i64,
    /// Lanes currently carrying a priority vehicle. Treated as a set.
    #[serde(deserialize_with = "null_as_default")]
    pub emergency_lane: Vec<i64>,
    /// Per-lane counts keyed "1".."4". A `null` count reads as 0.
    #[serde(deserialize_with = "lane_counts")]
    pub lane_vehicle_counts: BTreeMap<String, i64>,
}

impl Default for TrafficSnapshot {
    fn default() -> Self {
        let lane_vehicle_counts = LANE_CONFIGS
            .iter()
            .map(|lane| (lane.id.key(), 0))
            .collect();
        Self {
            vehicle_count: 0,
            emergency_lane: Vec::new(),
            lane_vehicle_counts,
        }
    }
}

impl TrafficSnapshot {
    /// Vehicle count for a lane; absent keys and negative values read as 0.
    /// Counts beyond `usize` saturate.
    pub fn count_for(&self, lane: LaneId) -> usize {
        self.lane_vehicle_counts
            .get(&lane.key())
            .map(|&count| usize::try_from(count.max(0)).unwrap_or(usize::MAX))
            .unwrap_or(0)
    }

    pub fn is_emergency(&self, lane: LaneId) -> bool {
        self.emergency_lane.contains(&(lane.get() as i64))
    }

    /// Known emergency lanes, de-duplicated and ordered. Unknown ids are dropped.
    pub fn emergency_lanes(&self) -> BTreeSet<LaneId> {
        self.emergency_lane
            .iter()
            .filter_map(|&raw| LaneId::new(raw))
            .collect()
    }

    pub fn total_vehicles(&self) -> u64 {
        self.vehicle_count.max(0) as u64
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lane_counts<'de, D>(deserializer: D) -> Result<BTreeMap<String, i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<i64>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(lane, count)| (lane, count.unwrap_or(0)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_all_zero() {
        let snapshot = TrafficSnapshot::default();
        assert_eq!(snapshot.vehicle_count, 0);
        assert!(snapshot.emergency_lane.is_empty());
        assert_eq!(snapshot.lane_vehicle_counts.len(), 4);
        for lane in LANE_CONFIGS.iter() {
            assert_eq!(snapshot.count_for(lane.id), 0);
        }
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let snapshot: TrafficSnapshot =
            serde_json::from_str(r#"{"lane_vehicle_counts": {"1": 2, "2": 1, "4": 7}}"#).unwrap();
        assert_eq!(snapshot.vehicle_count, 0);
        assert!(snapshot.emergency_lane.is_empty());
        assert_eq!(snapshot.count_for(LaneId::SOUTH), 0);
        assert_eq!(snapshot.count_for(LaneId::WEST), 7);
    }

    #[test]
    fn unknown_fields_and_lanes_are_ignored() {
        let snapshot: TrafficSnapshot = serde_json::from_str(
            r#"{"vehicle_count": 3, "signal": "green", "emergency_lane": [9, 2, 2],
                "lane_vehicle_counts": {"1": 1, "7": 40}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.emergency_lanes().into_iter().collect::<Vec<_>>(), vec![LaneId::EAST]);
        assert_eq!(snapshot.count_for(LaneId::NORTH), 1);
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        let snapshot: TrafficSnapshot = serde_json::from_str(
            r#"{"vehicle_count": -4, "lane_vehicle_counts": {"1": -3}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.count_for(LaneId::NORTH), 0);
        assert_eq!(snapshot.total_vehicles(), 0);
    }

    #[test]
    fn vehicle_count_is_not_derived_from_lanes() {
        let snapshot: TrafficSnapshot = serde_json::from_str(
            r#"{"vehicle_count": 12, "lane_vehicle_counts": {"1": 1, "2": 1, "3": 0, "4": 0}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.total_vehicles(), 12);
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let snapshot: TrafficSnapshot = serde_json::from_str(
            r#"{"vehicle_count": null, "emergency_lane": null,
                "lane_vehicle_counts": {"1": null, "2": 3}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.vehicle_count, 0);
        assert!(snapshot.emergency_lane.is_empty());
        assert_eq!(snapshot.lane_vehicle_counts.get("1"), Some(&0));
        assert_eq!(snapshot.count_for(LaneId::NORTH), 0);
        assert_eq!(snapshot.count_for(LaneId::EAST), 3);
    }

    #[test]
    fn null_lane_table_reads_as_empty() {
        let snapshot: TrafficSnapshot =
            serde_json::from_str(r#"{"vehicle_count": 2, "lane_vehicle_counts": null}"#).unwrap();
        assert!(snapshot.lane_vehicle_counts.is_empty());
        assert_eq!(snapshot.count_for(LaneId::SOUTH), 0);
        assert_eq!(snapshot.total_vehicles(), 2);
    }

    #[test]
    fn huge_counts_are_kept_as_sent() {
        let snapshot: TrafficSnapshot = serde_json::from_str(
            r#"{"vehicle_count": 9223372036854775807,
                "lane_vehicle_counts": {"1": 9223372036854775807}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.lane_vehicle_counts.get("1"), Some(&i64::MAX));
        assert!(snapshot.count_for(LaneId::NORTH) > 0);
        assert_eq!(snapshot.total_vehicles(), i64::MAX as u64);
    }
}
