pub mod plotters_surface;

pub use plotters_surface::{
    draw_scene, render_png_file, render_svg_file, render_svg_string, RenderError,
};
