use crate::models::color::Rgb;
use crate::models::lane::LaneId;
use serde::Serialize;

/// Drawing surface dimensions in scene units (pixels for the bundled renderers).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned, optionally rounded rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub fill: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
}

/// Drop-shadow style halo around a marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Glow {
    pub color: Rgb,
    pub blur: f64,
}

/// One vehicle on a lane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Stable identity across re-renders: "<lane>-<index>".
    pub key: String,
    pub index: usize,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill: Rgb,
    pub stroke: Option<Stroke>,
    pub glow: Glow,
    pub emergency: bool,
    /// Surfaces that animate should pulse this marker.
    pub pulse: bool,
}

/// Markers for one lane, nearest the intersection first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneMarkers {
    pub lane: LaneId,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub lane: LaneId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub color: Rgb,
    pub bold: bool,
}

/// Renderer-agnostic description of the intersection for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub canvas: CanvasSize,
    pub background: Rgb,
    pub roads: Vec<RectPrimitive>,
    pub intersection: RectPrimitive,
    pub dividers: Vec<RectPrimitive>,
    pub lanes: Vec<LaneMarkers>,
    pub labels: Vec<Label>,
}

impl Scene {
    pub fn markers_for(&self, lane: LaneId) -> &[Marker] {
        self.lanes
            .iter()
            .find(|l| l.lane == lane)
            .map(|l| l.markers.as_slice())
            .unwrap_or(&[])
    }

    pub fn marker_count(&self) -> usize {
        self.lanes.iter().map(|l| l.markers.len()).sum()
    }
}
