use crate::global_variables::{
    AMQP_URL, CHANNEL_TRAFFIC, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, SVG_OUTPUT_PATH,
};
use crate::scene::primitives::CanvasSize;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime settings for the monitor binary.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub amqp_url: String,
    pub channel: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub svg_path: PathBuf,
    /// PNG output is only written when set.
    pub png_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            amqp_url: AMQP_URL.to_string(),
            channel: CHANNEL_TRAFFIC.to_string(),
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            svg_path: PathBuf::from(SVG_OUTPUT_PATH),
            png_path: None,
        }
    }
}

impl MonitorConfig {
    /// Defaults overridden by `TRAFFIC_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`MonitorConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            amqp_url: non_empty("TRAFFIC_AMQP_URL").unwrap_or(defaults.amqp_url),
            channel: non_empty("TRAFFIC_CHANNEL").unwrap_or(defaults.channel),
            canvas_width: parse_or(&lookup, "TRAFFIC_CANVAS_WIDTH", defaults.canvas_width),
            canvas_height: parse_or(&lookup, "TRAFFIC_CANVAS_HEIGHT", defaults.canvas_height),
            svg_path: non_empty("TRAFFIC_SVG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.svg_path),
            png_path: non_empty("TRAFFIC_PNG_PATH").map(PathBuf::from),
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width as f64, self.canvas_height as f64)
    }
}

fn parse_or<L, T>(lookup: &L, key: &str, default: T) -> T
where
    L: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring {}={:?}; using {}", key, raw, default);
                default
            }
        },
        None => default,
    }
}
