use crate::models::lane::LaneConfig;
use crate::scene::layout::{
    LayoutMetrics, BACKGROUND_COLOR, EMERGENCY_FILL, EMERGENCY_STROKE,
};
use crate::scene::primitives::{CanvasSize, Glow, LaneMarkers, Marker, Scene, Stroke};
use crate::shared_data::TrafficSnapshot;

const EMERGENCY_GLOW_BLUR: f64 = 8.0;
const NORMAL_GLOW_BLUR: f64 = 4.0;
const EMERGENCY_STROKE_WIDTH: f64 = 2.0;

/// Most markers drawn for one lane. Larger counts are still reported in the
/// summary, but the queue drawing stops here.
pub const MAX_LANE_MARKERS: usize = 200;

/// Builds the scene for `snapshot` with the default layout metrics.
pub fn build_scene(
    snapshot: &TrafficSnapshot,
    lanes: &[LaneConfig],
    canvas: CanvasSize,
) -> Scene {
    build_scene_with(snapshot, lanes, canvas, &LayoutMetrics::default())
}

/// Pure: the same inputs always give an identical scene. Only the lanes in
/// `lanes` are drawn; snapshot entries for any other lane id are ignored.
pub fn build_scene_with(
    snapshot: &TrafficSnapshot,
    lanes: &[LaneConfig],
    canvas: CanvasSize,
    metrics: &LayoutMetrics,
) -> Scene {
    Scene {
        canvas,
        background: BACKGROUND_COLOR,
        roads: metrics.roads(canvas),
        intersection: metrics.intersection(canvas),
        dividers: metrics.dividers(canvas),
        lanes: lanes
            .iter()
            .map(|lane| lane_markers(snapshot, lane, canvas, metrics))
            .collect(),
        labels: lanes.iter().map(|lane| metrics.label(canvas, lane)).collect(),
    }
}

fn lane_markers(
    snapshot: &TrafficSnapshot,
    lane: &LaneConfig,
    canvas: CanvasSize,
    metrics: &LayoutMetrics,
) -> LaneMarkers {
    let count = snapshot.count_for(lane.id).min(MAX_LANE_MARKERS);
    let emergency_lane = snapshot.is_emergency(lane.id);
    let (x0, y0) = metrics.lane_anchor(canvas, lane);
    let (dx, dy) = metrics.marker_step(lane);

    let markers = (0..count)
        .map(|index| {
            // Only the lead vehicle of an emergency lane is the priority vehicle.
            let emergency = emergency_lane && index == 0;
            let offset = index as f64;
            let cx = x0 + dx * offset;
            let cy = y0 + dy * offset;
            let key = format!("{}-{}", lane.id, index);
            if emergency {
                Marker {
                    key,
                    index,
                    cx,
                    cy,
                    radius: metrics.marker_radius + 1.0,
                    fill: EMERGENCY_FILL,
                    stroke: Some(Stroke {
                        color: EMERGENCY_STROKE,
                        width: EMERGENCY_STROKE_WIDTH,
                    }),
                    glow: Glow {
                        color: EMERGENCY_FILL,
                        blur: EMERGENCY_GLOW_BLUR,
                    },
                    emergency: true,
                    pulse: true,
                }
            } else {
                Marker {
                    key,
                    index,
                    cx,
                    cy,
                    radius: metrics.marker_radius,
                    fill: lane.color,
                    stroke: None,
                    glow: Glow {
                        color: lane.color,
                        blur: NORMAL_GLOW_BLUR,
                    },
                    emergency: false,
                    pulse: false,
                }
            }
        })
        .collect();

    LaneMarkers {
        lane: lane.id,
        markers,
    }
}
