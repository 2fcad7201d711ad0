use crate::models::color::Rgb;
use crate::scene::primitives::{Marker, RectPrimitive, Scene};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing error: {0}")]
    Drawing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;

fn drawing_error<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn point(x: f64, y: f64) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn draw_rect<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    rect: &RectPrimitive,
) -> Result<()> {
    root.draw(&Rectangle::new(
        [
            point(rect.x, rect.y),
            point(rect.x + rect.width, rect.y + rect.height),
        ],
        rgb(rect.fill).filled(),
    ))
    .map_err(drawing_error)
}

fn draw_marker<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, marker: &Marker) -> Result<()> {
    let centre = point(marker.cx, marker.cy);
    // Halo stands in for the drop shadow: translucent disc reaching half the blur.
    let halo = (marker.radius + marker.glow.blur / 2.0).round() as i32;
    root.draw(&Circle::new(
        centre,
        halo,
        rgb(marker.glow.color).mix(0.3).filled(),
    ))
    .map_err(drawing_error)?;
    root.draw(&Circle::new(
        centre,
        marker.radius.round() as i32,
        rgb(marker.fill).filled(),
    ))
    .map_err(drawing_error)?;
    if let Some(stroke) = &marker.stroke {
        root.draw(&Circle::new(
            centre,
            marker.radius.round() as i32,
            rgb(stroke.color).stroke_width(stroke.width.round() as u32),
        ))
        .map_err(drawing_error)?;
    }
    Ok(())
}

/// Draws a scene onto any plotters drawing area, back to front: background,
/// roads, intersection, dividers, markers, labels.
pub fn draw_scene<DB: DrawingBackend>(scene: &Scene, root: &DrawingArea<DB, Shift>) -> Result<()> {
    root.fill(&rgb(scene.background)).map_err(drawing_error)?;
    for road in &scene.roads {
        draw_rect(root, road)?;
    }
    draw_rect(root, &scene.intersection)?;
    for divider in &scene.dividers {
        draw_rect(root, divider)?;
    }
    for lane in &scene.lanes {
        for marker in &lane.markers {
            draw_marker(root, marker)?;
        }
    }
    for label in &scene.labels {
        let mut font = ("sans-serif", label.font_size).into_font();
        if label.bold {
            font = font.style(FontStyle::Bold);
        }
        root.draw(&Text::new(
            label.text.clone(),
            point(label.x, label.y),
            TextStyle::from(font)
                .color(&rgb(label.color))
                .pos(Pos::new(HPos::Left, VPos::Bottom)),
        ))
        .map_err(drawing_error)?;
    }
    Ok(())
}

fn canvas_pixels(scene: &Scene) -> (u32, u32) {
    (
        scene.canvas.width.max(1.0).round() as u32,
        scene.canvas.height.max(1.0).round() as u32,
    )
}

/// Renders the scene to an SVG document in memory.
pub fn render_svg_string(scene: &Scene) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, canvas_pixels(scene)).into_drawing_area();
        draw_scene(scene, &root)?;
        root.present().map_err(drawing_error)?;
    }
    Ok(svg)
}

pub fn render_svg_file(scene: &Scene, path: &Path) -> Result<()> {
    let svg = render_svg_string(scene)?;
    std::fs::write(path, svg)?;
    Ok(())
}

pub fn render_png_file(scene: &Scene, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, canvas_pixels(scene)).into_drawing_area();
    draw_scene(scene, &root)?;
    root.present().map_err(drawing_error)?;
    Ok(())
}
