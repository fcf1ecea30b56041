use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use serde_derive::{Deserialize, Serialize};

use crate::config::SensorConfig;
use crate::types::{Coordinate, UserLocationSample};
use crate::util::distance_m;

/// One reading from a device sensor.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorEvent {
    Position { latitude: f64, longitude: f64 },
    /// Raw magnetometer field strength along the device axes.
    Magnetometer { x: f64, y: f64 },
}

/// Compass heading in degrees [0, 360) from a magnetometer reading, or None for a zero reading
/// whose direction is undefined.
pub fn heading_from_magnetometer(x: f64, y: f64) -> Option<f64> {
    if x == 0.0 && y == 0.0 {
        return None;
    }
    let angle = y.atan2(x).to_degrees();
    let angle = if angle >= 0.0 { angle } else { angle + 360.0 };
    // -0.0 + 360 can round up to exactly 360.
    Some(if angle >= 360.0 { 0.0 } else { angle })
}

/// Merges position and heading readings into one sample, last value wins per axis.
#[derive(Debug, Clone, Default)]
pub struct SensorFusion {
    current: Option<UserLocationSample>,
}

impl SensorFusion {
    pub fn new() -> SensorFusion {
        SensorFusion::default()
    }

    pub fn current(&self) -> Option<UserLocationSample> {
        self.current
    }

    /// Fold one reading in and return the merged sample. A position keeps the last heading
    /// (0 before any compass reading); a heading keeps the last position ((0, 0) before any fix).
    pub fn apply(&mut self, event: &SensorEvent) -> Option<UserLocationSample> {
        match *event {
            SensorEvent::Position { latitude, longitude } => {
                let heading = self.current.map_or(0.0, |s| s.heading);
                self.current = Some(UserLocationSample {
                    latitude: latitude,
                    longitude: longitude,
                    heading: heading,
                });
            }
            SensorEvent::Magnetometer { x, y } => {
                if let Some(heading) = heading_from_magnetometer(x, y) {
                    let mut next = self.current.unwrap_or(UserLocationSample {
                        latitude: 0.0,
                        longitude: 0.0,
                        heading: heading,
                    });
                    next.heading = heading;
                    self.current = Some(next);
                }
            }
        }
        self.current
    }
}

/// Outcome of asking the user for sensor access.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
}

/// Handle to a running sensor feed. The feed stops when the handle is removed or dropped.
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub fn new() -> (Subscription, Arc<AtomicBool>) {
        let active = Arc::new(AtomicBool::new(true));
        (Subscription { active: active.clone() }, active)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn remove(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// A source of position and heading readings.
pub trait SensorProvider {
    fn request_permission(&mut self) -> Permission;
    /// Start delivering readings to `sink`, throttled by `options`.
    fn subscribe(&mut self, options: &SensorConfig, sink: Sender<SensorEvent>) -> Subscription;
}

/// Ask for permission and subscribe. A denial aborts quietly: no subscription, and the map just
/// never gets a user location.
pub fn start<P: SensorProvider + ?Sized>(provider: &mut P,
                                         options: &SensorConfig,
                                         sink: Sender<SensorEvent>)
                                         -> Option<Subscription> {
    match provider.request_permission() {
        Permission::Granted => Some(provider.subscribe(options, sink)),
        Permission::Denied => {
            warn!("location permission denied, map will not follow the user");
            None
        }
    }
}

/// Drops readings that arrive faster than the configured intervals, and GPS fixes that moved
/// less than the configured distance.
#[derive(Debug, Clone)]
pub struct Throttle {
    options: SensorConfig,
    last_fix: Option<(u64, Coordinate)>,
    last_heading: Option<u64>,
}

impl Throttle {
    pub fn new(options: &SensorConfig) -> Throttle {
        Throttle {
            options: options.clone(),
            last_fix: None,
            last_heading: None,
        }
    }

    /// Whether a reading taken at `t_ms` passes.
    pub fn admit(&mut self, t_ms: u64, event: &SensorEvent) -> bool {
        match *event {
            SensorEvent::Position { latitude, longitude } => {
                let here = Coordinate::new(latitude, longitude);
                if let Some((t, last)) = self.last_fix {
                    if t_ms.saturating_sub(t) < self.options.gps_interval_ms ||
                       distance_m(&last, &here) < self.options.gps_distance_m {
                        return false;
                    }
                }
                self.last_fix = Some((t_ms, here));
                true
            }
            SensorEvent::Magnetometer { .. } => {
                if let Some(t) = self.last_heading {
                    if t_ms.saturating_sub(t) < self.options.heading_interval_ms {
                        return false;
                    }
                }
                self.last_heading = Some(t_ms);
                true
            }
        }
    }
}

/// One recorded reading with its timestamp in milliseconds.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub t: u64,
    #[serde(flatten)]
    pub event: SensorEvent,
}

/// Replays a recorded sensor trace on its own thread. Readings are throttled the way a device
/// would deliver them and stop once the subscription is gone.
pub struct ReplayProvider {
    permission: Permission,
    trace: Vec<TimedEvent>,
    pace: f64,
}

impl ReplayProvider {
    pub fn new(trace: Vec<TimedEvent>) -> ReplayProvider {
        ReplayProvider {
            permission: Permission::Granted,
            trace: trace,
            pace: 0.0,
        }
    }

    pub fn denied() -> ReplayProvider {
        ReplayProvider {
            permission: Permission::Denied,
            trace: Vec::new(),
            pace: 0.0,
        }
    }

    /// Wall-clock milliseconds to wait per trace millisecond. 1.0 replays in real time, 0.0
    /// (the default) as fast as the receiver takes them.
    pub fn with_pace(mut self, pace: f64) -> ReplayProvider {
        self.pace = if pace.is_finite() { pace.max(0.0) } else { 0.0 };
        self
    }
}

impl SensorProvider for ReplayProvider {
    fn request_permission(&mut self) -> Permission {
        self.permission
    }

    fn subscribe(&mut self, options: &SensorConfig, sink: Sender<SensorEvent>) -> Subscription {
        let (sub, active) = Subscription::new();
        let mut throttle = Throttle::new(options);
        let trace = self.trace.clone();
        let pace = self.pace;
        thread::spawn(move || {
            let mut sent = 0;
            let mut clock = trace.first().map_or(0, |te| te.t);
            for te in &trace {
                if pace > 0.0 {
                    let wait = te.t.saturating_sub(clock) as f64 * pace;
                    thread::sleep(Duration::from_micros((wait * 1000.0) as u64));
                }
                clock = clock.max(te.t);
                if !active.load(Ordering::SeqCst) {
                    debug!("sensor subscription removed, replay stopped");
                    break;
                }
                if !throttle.admit(te.t, &te.event) {
                    continue;
                }
                if sink.send(te.event).is_err() {
                    break;
                }
                sent += 1;
            }
            debug!("replayed {} of {} sensor readings", sent, trace.len());
        });
        sub
    }
}
