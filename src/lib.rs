//! Draw a field boundary and points of interest on an infinite grid that follows the user's GPS
//! position and compass heading.
//!
//! The flow is: coordinates are typed or dictated into a [`FieldForm`], submitted into the
//! [`AppState`], and shown by a [`GridMap`]. Sensor readings and touch gestures arrive on one
//! [`EventLoop`] channel; every change redraws the whole map onto a [`Surface`] such as the
//! [`Canvas`] raster.

mod types;
pub use types::*;
pub mod config;
pub mod error;
pub mod events;
pub mod geojson_io;
pub mod input;
pub mod projection;
pub mod raster;
pub mod render;
pub mod sensor;
pub mod store;
pub mod transcript;
pub mod util;
pub mod view;

pub use config::{Config, MapConfig, SensorConfig};
pub use error::{Error, InputError, Result};
pub use events::{EventLoop, MapEvent};
pub use input::FieldForm;
pub use projection::{Projection, DEFAULT_PIXELS_PER_DEGREE};
pub use raster::Canvas;
pub use render::{Frame, GridMap, Surface};
pub use sensor::{SensorEvent, SensorFusion};
pub use store::AppState;
pub use view::{Gesture, ViewState};

/// Build the map screen for a store: points of interest as markers and the bounding rectangle
/// as the outline.
pub fn map_for_state(state: &AppState, config: MapConfig) -> GridMap {
    let mut map = GridMap::new(config);
    sync_map(&mut map, state);
    map
}

/// Push a new store into a mounted map, keeping its zoom, pan and user location.
pub fn sync_map(map: &mut GridMap, state: &AppState) {
    map.set_points(state.points_of_interest().to_vec());
    map.set_shape(state.outline());
}
