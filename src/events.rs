use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::debug;
use serde_derive::{Deserialize, Serialize};

use crate::render::{GridMap, Surface};
use crate::sensor::{SensorEvent, SensorFusion};
use crate::types::Coordinate;
use crate::view::Gesture;

/// Everything that can change what the map shows while it is mounted.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapEvent {
    Sensor(SensorEvent),
    Gesture(Gesture),
}

impl From<SensorEvent> for MapEvent {
    fn from(e: SensorEvent) -> MapEvent {
        MapEvent::Sensor(e)
    }
}

impl From<Gesture> for MapEvent {
    fn from(g: Gesture) -> MapEvent {
        MapEvent::Gesture(g)
    }
}

fn reborrow<'a>(surface: &'a mut Option<&mut dyn Surface>) -> Option<&'a mut dyn Surface> {
    match *surface {
        Some(ref mut s) => Some(&mut **s),
        None => None,
    }
}

/// Single consumer of the merged sensor and gesture stream. Every producer holds a clone of the
/// sender; the loop ends once all of them are dropped.
pub struct EventLoop {
    rx: Receiver<MapEvent>,
    fusion: SensorFusion,
    processed: u64,
}

impl EventLoop {
    pub fn new() -> (EventLoop, Sender<MapEvent>) {
        let (tx, rx) = channel();
        (EventLoop {
             rx: rx,
             fusion: SensorFusion::new(),
             processed: 0,
         },
         tx)
    }

    /// Sender for a sensor feed that speaks `SensorEvent`. Readings are forwarded onto the merged
    /// stream until the returned sender is dropped.
    pub fn sensor_bridge(tx: Sender<MapEvent>) -> (Sender<SensorEvent>, JoinHandle<()>) {
        let (stx, srx) = channel::<SensorEvent>();
        let handle = thread::spawn(move || {
            for e in srx {
                if tx.send(MapEvent::Sensor(e)).is_err() {
                    break;
                }
            }
        });
        (stx, handle)
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Apply one event to the map and run the redraw trigger.
    pub fn dispatch(&mut self,
                    event: &MapEvent,
                    map: &mut GridMap,
                    surface: Option<&mut dyn Surface>) {
        match *event {
            MapEvent::Sensor(ref e) => {
                if let SensorEvent::Position { latitude, longitude } = *e {
                    map.pin_reference(Coordinate::new(latitude, longitude));
                }
                let sample = self.fusion.apply(e);
                map.set_user_location(sample);
            }
            MapEvent::Gesture(ref g) => map.on_gesture(g),
        }
        self.processed += 1;
        map.render(surface);
    }

    /// Handle queued events without blocking. Return how many were handled.
    pub fn drain(&mut self, map: &mut GridMap, mut surface: Option<&mut dyn Surface>) -> usize {
        let mut n = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(&event, map, reborrow(&mut surface));
            n += 1;
        }
        n
    }

    /// Block on the stream until every sender is gone, redrawing after each event.
    pub fn run(mut self, map: &mut GridMap, mut surface: Option<&mut dyn Surface>) -> u64 {
        while let Ok(event) = self.rx.recv() {
            self.dispatch(&event, map, reborrow(&mut surface));
        }
        debug!("event stream closed after {} events, {} redraws",
               self.processed,
               map.redraws());
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::raster::Canvas;
    use crate::render::{Layer, Primitive};
    use crate::types::Viewport;

    #[test]
    fn sensor_events_move_user() {
        let (mut ev, tx) = EventLoop::new();
        let mut map = GridMap::new(MapConfig::default());
        tx.send(SensorEvent::Position { latitude: 3.0, longitude: 4.0 }.into()).unwrap();
        tx.send(SensorEvent::Magnetometer { x: 0.0, y: 2.0 }.into()).unwrap();
        assert_eq!(ev.drain(&mut map, None), 2);
        let s = map.user_location().unwrap();
        assert_eq!((s.latitude, s.longitude), (3.0, 4.0));
        assert!((s.heading - 90.0).abs() < 1e-9);
    }

    #[test]
    fn producers_on_threads_merge_into_one_stream() {
        let (ev, tx) = EventLoop::new();
        let gps = tx.clone();
        let touch = tx.clone();
        drop(tx);
        let a = thread::spawn(move || {
            for i in 0..5 {
                gps.send(SensorEvent::Position {
                            latitude: i as f64 * 0.001,
                            longitude: 0.0,
                        }
                        .into())
                    .unwrap();
            }
        });
        let b = thread::spawn(move || {
            touch.send(Gesture::Pinch { scale: 2.0 }.into()).unwrap();
            touch.send(Gesture::Pan { dx: Some(3.0), dy: Some(4.0) }.into()).unwrap();
        });
        a.join().unwrap();
        b.join().unwrap();
        let mut map = GridMap::new(MapConfig::default());
        let mut canvas = Canvas::new(40, 40);
        assert_eq!(ev.run(&mut map, Some(&mut canvas)), 7);
        assert_eq!(map.view().scale(), 2.0);
        assert_eq!(map.view().offset_x, 3.0);
        assert_eq!(map.user_location().unwrap().latitude, 0.004);
        assert_eq!(map.redraws(), 7);
    }

    #[test]
    fn heading_before_fix_does_not_pin_reference() {
        let mut config = MapConfig::default();
        config.auto_center = false;
        let mut map = GridMap::new(config);
        let (mut ev, tx) = EventLoop::new();
        tx.send(SensorEvent::Magnetometer { x: 0.0, y: 1.0 }.into()).unwrap();
        tx.send(SensorEvent::Position { latitude: 50.0644, longitude: 19.9446 }.into()).unwrap();
        tx.send(SensorEvent::Position { latitude: 50.0645, longitude: 19.9446 }.into()).unwrap();
        assert_eq!(ev.drain(&mut map, None), 3);
        assert_eq!(map.reference(), Coordinate::new(50.0644, 19.9446));
        let frame = map.frame(Viewport::new(400.0, 800.0));
        let first = frame.layer(Layer::User).next();
        match first {
            Some(&Primitive::Disc { center, .. }) => {
                assert!((center.x - 200.0).abs() < 1e-6);
                assert!((center.y - 399.9).abs() < 1e-6);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bridge_forwards_sensor_feed() {
        let (ev, tx) = EventLoop::new();
        let (stx, handle) = EventLoop::sensor_bridge(tx);
        stx.send(SensorEvent::Position { latitude: 1.0, longitude: 2.0 }).unwrap();
        drop(stx);
        handle.join().unwrap();
        let mut map = GridMap::new(MapConfig::default());
        assert_eq!(ev.run(&mut map, None), 1);
        assert_eq!(map.user_location().unwrap().longitude, 2.0);
    }

    #[test]
    fn events_decode_without_wrapper() {
        let e: MapEvent = serde_json::from_str(r#"{"kind": "pinch", "scale": 0.05}"#).unwrap();
        assert_eq!(e, MapEvent::Gesture(Gesture::Pinch { scale: 0.05 }));
        let e: MapEvent =
            serde_json::from_str(r#"{"kind": "position", "latitude": 1.0, "longitude": 2.0}"#)
                .unwrap();
        assert_eq!(e,
                   MapEvent::Sensor(SensorEvent::Position { latitude: 1.0, longitude: 2.0 }));
    }
}
