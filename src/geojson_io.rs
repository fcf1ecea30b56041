use std::io::{Read, Write};

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue, Value};
use log::warn;

use crate::error::{Error, Result};
use crate::input::FIELD_POINTS;
use crate::store::AppState;
use crate::types::{Coordinate, UserLocationSample};

/// Points of interest and field boundary read from a GeoJSON document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub points: Vec<Coordinate>,
    pub field: Vec<Coordinate>,
}

fn coordinate(pos: &[f64]) -> Result<Coordinate> {
    if pos.len() < 2 {
        return Err(Error::GeoJson(format!("position needs longitude and latitude, got {:?}",
                                          pos)));
    }
    Ok(Coordinate::new(pos[1], pos[0]))
}

fn position(c: &Coordinate) -> Vec<f64> {
    vec![c.longitude, c.latitude]
}

/// Ring of the outline with the closing point dropped.
fn open_ring(ring: &[Vec<f64>]) -> Result<Vec<Coordinate>> {
    let mut coords = ring.iter().map(|p| coordinate(p)).collect::<Result<Vec<_>>>()?;
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    Ok(coords)
}

fn closed_ring(coords: &[Coordinate]) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = coords.iter().map(position).collect();
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

fn collect_geometry(value: &Value, scene: &mut Scene) -> Result<()> {
    match *value {
        Value::Point(ref p) => scene.points.push(coordinate(p)?),
        Value::MultiPoint(ref ps) => {
            for p in ps {
                scene.points.push(coordinate(p)?);
            }
        }
        Value::LineString(ref line) if scene.field.is_empty() => scene.field = open_ring(line)?,
        Value::Polygon(ref rings) if scene.field.is_empty() => {
            if let Some(outer) = rings.first() {
                scene.field = open_ring(outer)?;
            }
        }
        Value::GeometryCollection(ref geoms) => {
            for g in geoms {
                collect_geometry(&g.value, scene)?;
            }
        }
        _ => (),
    }
    Ok(())
}

/// Features this crate exports for display only. They are derived from the field and the live
/// position, so reading them back would duplicate state.
const DERIVED_KINDS: [&str; 2] = ["bounds", "user"];

fn collect_feature(feature: &Feature, scene: &mut Scene) -> Result<()> {
    let kind = feature.properties
        .as_ref()
        .and_then(|props| props.get("kind"))
        .and_then(|k| k.as_str());
    if kind.map_or(false, |k| DERIVED_KINDS.contains(&k)) {
        return Ok(());
    }
    match feature.geometry {
        Some(ref geometry) => collect_geometry(&geometry.value, scene),
        None => Ok(()),
    }
}

/// Read a GeoJSON document: every point becomes a point of interest, the first line string or
/// polygon becomes the field boundary. Other geometry is ignored, as are the `bounds` and `user`
/// features written by [`scene_to_geojson`].
pub fn read_scene<R: Read>(reader: R) -> Result<Scene> {
    let json: GeoJson = serde_json::from_reader(reader)?;
    let mut scene = Scene::default();
    match json {
        GeoJson::FeatureCollection(ref fc) => {
            for feature in &fc.features {
                collect_feature(feature, &mut scene)?;
            }
        }
        GeoJson::Feature(ref feature) => collect_feature(feature, &mut scene)?,
        GeoJson::Geometry(ref geometry) => collect_geometry(&geometry.value, &mut scene)?,
    }
    Ok(scene)
}

/// Merge a scene into the store. Points of interest replace the current ones when the scene has
/// any. The field is taken only when it has exactly four points, otherwise it is left alone.
pub fn apply_scene(state: AppState, scene: Scene) -> AppState {
    let mut state = state;
    if !scene.points.is_empty() {
        state = state.set_points_of_interest(scene.points);
    }
    match scene.field.len() {
        0 => (),
        FIELD_POINTS => state = state.set_field_coords(scene.field),
        n => warn!("field boundary needs {} points, scene has {}; keeping current", FIELD_POINTS, n),
    }
    state
}

fn feature(value: Value, kind: &str, extra: &[(&str, JsonValue)]) -> Feature {
    let mut props = JsonObject::new();
    props.insert("kind".to_string(), JsonValue::from(kind));
    for &(key, ref v) in extra {
        props.insert(key.to_string(), v.clone());
    }
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// Export what the map shows: field polygon, bounding rectangle, points of interest and the user
/// position when known.
pub fn scene_to_geojson(state: &AppState, user: Option<&UserLocationSample>) -> GeoJson {
    let mut features = Vec::new();
    if state.field_coords().len() >= 3 {
        features.push(feature(Value::Polygon(vec![closed_ring(state.field_coords())]),
                              "field",
                              &[]));
    }
    features.push(feature(Value::Polygon(vec![closed_ring(&state.outline())]), "bounds", &[]));
    for (i, p) in state.points_of_interest().iter().enumerate() {
        features.push(feature(Value::Point(position(p)), "poi", &[("index", JsonValue::from(i))]));
    }
    if let Some(u) = user {
        let extra = if u.heading.is_nan() {
            vec![]
        } else {
            vec![("heading", JsonValue::from(u.heading))]
        };
        features.push(feature(Value::Point(position(&u.position())), "user", &extra));
    }
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features: features,
        foreign_members: None,
    })
}

pub fn write_scene<W: Write>(mut writer: W, json: &GeoJson) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, json)?;
    writer.flush()?;
    Ok(())
}
