use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::projection::DEFAULT_PIXELS_PER_DEGREE;
use crate::types::{Rgb, Stroke, Viewport};

/// Colours and line widths of the four map layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyle {
    pub background: Rgb,
    pub grid: Stroke,
    pub outline: Stroke,
    pub point: Rgb,
    pub user: Rgb,
    pub heading: Stroke,
}

impl Default for MapStyle {
    fn default() -> Self {
        MapStyle {
            background: Rgb::WHITE,
            grid: Stroke::new(Rgb::LIGHT_GRAY, 0.5),
            outline: Stroke::new(Rgb::BLUE, 2.0),
            point: Rgb::RED,
            user: Rgb::GREEN,
            heading: Stroke::new(Rgb::BLACK, 2.0),
        }
    }
}

/// Renderer settings. All lengths are pixels at scale 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub viewport: Viewport,
    pub pixels_per_degree: f64,
    pub grid_spacing: f64,
    pub min_scale: f64,
    pub point_radius: f64,
    pub user_radius: f64,
    pub heading_length: f64,
    /// Keep the reference point on the latest user sample. When false the reference is pinned
    /// at the first GPS fix and the user marker moves instead.
    pub auto_center: bool,
    pub style: MapStyle,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            viewport: Viewport::new(400.0, 800.0),
            pixels_per_degree: DEFAULT_PIXELS_PER_DEGREE,
            grid_spacing: 50.0,
            min_scale: 0.1,
            point_radius: 2.0,
            user_radius: 5.0,
            heading_length: 15.0,
            auto_center: true,
            style: MapStyle::default(),
        }
    }
}

/// How often the sensors report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub gps_interval_ms: u64,
    pub gps_distance_m: f64,
    pub heading_interval_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            gps_interval_ms: 1000,
            gps_distance_m: 1.0,
            heading_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map: MapConfig,
    pub sensors: SensorConfig,
}

impl Config {
    /// Read the config from a JSON file, filling missing keys with defaults, then apply
    /// environment overrides and validate.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Config> {
        Config::load_with(path, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with the variable lookup supplied by the caller.
    pub fn load_with<P, F>(path: Option<P>, lookup: F) -> Result<Config>
        where P: AsRef<Path>,
              F: Fn(&str) -> Option<String>
    {
        let mut config = match path {
            Some(p) => {
                let file = File::open(p.as_ref())?;
                serde_json::from_reader(BufReader::new(file))?
            }
            None => Config::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Override values from `GRIDMAP_*` variables. `lookup` is `std::env::var` outside tests.
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) -> Result<()> {
        if let Some(v) = lookup("GRIDMAP_WIDTH") {
            self.map.viewport.width = parse_env("GRIDMAP_WIDTH", &v)?;
        }
        if let Some(v) = lookup("GRIDMAP_HEIGHT") {
            self.map.viewport.height = parse_env("GRIDMAP_HEIGHT", &v)?;
        }
        if let Some(v) = lookup("GRIDMAP_PIXELS_PER_DEGREE") {
            self.map.pixels_per_degree = parse_env("GRIDMAP_PIXELS_PER_DEGREE", &v)?;
        }
        if let Some(v) = lookup("GRIDMAP_AUTO_CENTER") {
            self.map.auto_center = parse_env("GRIDMAP_AUTO_CENTER", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let m = &self.map;
        positive("viewport.width", m.viewport.width)?;
        positive("viewport.height", m.viewport.height)?;
        positive("pixels_per_degree", m.pixels_per_degree)?;
        positive("grid_spacing", m.grid_spacing)?;
        positive("min_scale", m.min_scale)?;
        if !(self.sensors.gps_distance_m >= 0.0) {
            return Err(Error::Config(format!("gps_distance_m must not be negative, got {}",
                                             self.sensors.gps_distance_m)));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{}={:?} cannot be parsed", key, value)))
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{} must be a positive number, got {}", name, v)))
    }
}
