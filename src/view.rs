use serde_derive::{Deserialize, Serialize};

/// Gesture input as reported by the touch layer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Gesture {
    /// Absolute zoom factor reported by a pinch.
    Pinch { scale: f64 },
    /// Translation delta of a pan. A missing axis is `None`.
    Pan {
        #[serde(default)]
        dx: Option<f64>,
        #[serde(default)]
        dy: Option<f64>,
    },
}

/// Zoom and pan owned by one map. Lives as long as the map and is never reset.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    scale: f64,
    min_scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewState {
    pub fn new(min_scale: f64) -> ViewState {
        ViewState {
            scale: f64::max(1.0, min_scale),
            min_scale: min_scale,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    /// Take the pinch factor, floored at the minimum scale. A NaN factor ends on the floor.
    /// Return whether the scale changed.
    pub fn pinch(&mut self, reported: f64) -> bool {
        let scale = reported.max(self.min_scale);
        let changed = scale != self.scale;
        self.scale = scale;
        changed
    }

    /// Accumulate a pan delta. Events with a missing, zero or NaN delta on either axis are
    /// dropped. Return whether the offset changed.
    pub fn pan(&mut self, dx: Option<f64>, dy: Option<f64>) -> bool {
        match (usable(dx), usable(dy)) {
            (Some(dx), Some(dy)) => {
                self.offset_x += dx;
                self.offset_y += dy;
                true
            }
            _ => false,
        }
    }

    pub fn apply(&mut self, gesture: &Gesture) -> bool {
        match *gesture {
            Gesture::Pinch { scale } => self.pinch(scale),
            Gesture::Pan { dx, dy } => self.pan(dx, dy),
        }
    }
}

fn usable(d: Option<f64>) -> Option<f64> {
    d.filter(|v| *v != 0.0 && !v.is_nan())
}
