use crate::models::color::Rgb;
use crate::models::lane::{LaneConfig, Orientation, Side};
use crate::scene::primitives::{CanvasSize, Label, RectPrimitive};

pub const BACKGROUND_COLOR: Rgb = Rgb::new(0x00, 0x00, 0x00);
pub const ROAD_COLOR: Rgb = Rgb::new(0x1e, 0x29, 0x3b);
pub const INTERSECTION_COLOR: Rgb = Rgb::new(0x22, 0x22, 0x22);
pub const DIVIDER_COLOR: Rgb = Rgb::new(0x64, 0x74, 0x8b);
pub const EMERGENCY_FILL: Rgb = Rgb::new(0xef, 0x44, 0x44);
pub const EMERGENCY_STROKE: Rgb = Rgb::new(0xdc, 0x26, 0x26);

/// Fixed dimensions of the intersection drawing. They do not scale with the
/// canvas; the canvas only moves the centre and the road extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub road_width: f64,
    pub intersection_size: f64,
    /// Distance between the two approach lanes of a road; markers sit at
    /// half of this on either side of the centre line.
    pub lane_offset: f64,
    pub divider_thickness: f64,
    pub road_corner_radius: f64,
    pub intersection_corner_radius: f64,
    pub marker_radius: f64,
    pub marker_spacing: f64,
    /// Gap between the intersection edge and the lead marker.
    pub stop_line_gap: f64,
    pub label_font_size: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            road_width: 38.0,
            intersection_size: 50.0,
            lane_offset: 16.0,
            divider_thickness: 2.0,
            road_corner_radius: 3.0,
            intersection_corner_radius: 7.0,
            marker_radius: 3.0,
            marker_spacing: 10.0,
            stop_line_gap: 10.0,
            label_font_size: 11.0,
        }
    }
}

impl LayoutMetrics {
    /// Vertical road then horizontal road, both spanning the canvas.
    pub fn roads(&self, canvas: CanvasSize) -> Vec<RectPrimitive> {
        let (cx, cy) = canvas.center();
        vec![
            RectPrimitive {
                x: cx - self.road_width / 2.0,
                y: 0.0,
                width: self.road_width,
                height: canvas.height,
                corner_radius: self.road_corner_radius,
                fill: ROAD_COLOR,
            },
            RectPrimitive {
                x: 0.0,
                y: cy - self.road_width / 2.0,
                width: canvas.width,
                height: self.road_width,
                corner_radius: self.road_corner_radius,
                fill: ROAD_COLOR,
            },
        ]
    }

    pub fn intersection(&self, canvas: CanvasSize) -> RectPrimitive {
        let (cx, cy) = canvas.center();
        let half = self.intersection_size / 2.0;
        RectPrimitive {
            x: cx - half,
            y: cy - half,
            width: self.intersection_size,
            height: self.intersection_size,
            corner_radius: self.intersection_corner_radius,
            fill: INTERSECTION_COLOR,
        }
    }

    /// Centre lines from each canvas edge up to the intersection box,
    /// ordered top, bottom, left, right.
    pub fn dividers(&self, canvas: CanvasSize) -> Vec<RectPrimitive> {
        let (cx, cy) = canvas.center();
        let half = self.intersection_size / 2.0;
        let t = self.divider_thickness;
        let divider = |x, y, width, height| RectPrimitive {
            x,
            y,
            width,
            height,
            corner_radius: 0.0,
            fill: DIVIDER_COLOR,
        };
        vec![
            divider(cx - t / 2.0, 0.0, t, cy - half),
            divider(cx - t / 2.0, cy + half, t, canvas.height - (cy + half)),
            divider(0.0, cy - t / 2.0, cx - half, t),
            divider(cx + half, cy - t / 2.0, canvas.width - (cx + half), t),
        ]
    }

    /// Position of marker 0 for a lane: just outside the intersection box on
    /// the lane's side, offset from the centre line onto its own half.
    pub fn lane_anchor(&self, canvas: CanvasSize, lane: &LaneConfig) -> (f64, f64) {
        let (cx, cy) = canvas.center();
        let along = self.intersection_size / 2.0 + self.stop_line_gap;
        let across = self.lane_offset / 2.0 * lane.side.lane_offset_sign();
        let outward = lane.side.outward_sign();
        match lane.orientation {
            Orientation::Vertical => (cx + across, cy + outward * along),
            Orientation::Horizontal => (cx + outward * along, cy + across),
        }
    }

    /// Displacement between consecutive markers of a lane, pointing away
    /// from the intersection.
    pub fn marker_step(&self, lane: &LaneConfig) -> (f64, f64) {
        let step = self.marker_spacing * lane.side.outward_sign();
        match lane.orientation {
            Orientation::Vertical => (0.0, step),
            Orientation::Horizontal => (step, 0.0),
        }
    }

    /// Static road label for a lane.
    pub fn label(&self, canvas: CanvasSize, lane: &LaneConfig) -> Label {
        let (cx, cy) = canvas.center();
        let (x, y) = match lane.side {
            Side::Top => (cx - 60.0, 28.0),
            Side::Right => (canvas.width - 45.0, cy - 20.0),
            Side::Bottom => (cx + 23.0, canvas.height - 10.0),
            Side::Left => (15.0, cy + 29.0),
        };
        Label {
            lane: lane.id,
            text: lane.label(),
            x,
            y,
            font_size: self.label_font_size,
            color: lane.color,
            bold: true,
        }
    }
}
