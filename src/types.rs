use serde_derive::{Deserialize, Serialize};

/// Represent some map coordinate, in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate {
            latitude: latitude,
            longitude: longitude,
        }
    }
}

/// Merged GPS and compass reading. Heading is in degrees clockwise from north, in [0, 360), and
/// 0 until the first compass reading. A NaN heading hides the heading indicator.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub heading: f64,
}

impl UserLocationSample {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Axis-aligned rectangle around the field boundary.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingCorners {
    pub sw_corner: Coordinate,
    pub ne_corner: Coordinate,
}

impl BoundingCorners {
    pub fn range_lat(&self) -> f64 {
        self.ne_corner.latitude - self.sw_corner.latitude
    }
    pub fn range_lon(&self) -> f64 {
        self.ne_corner.longitude - self.sw_corner.longitude
    }

    /// Whether the coordinate lies inside the rectangle, edges included.
    pub fn contains(&self, c: &Coordinate) -> bool {
        self.sw_corner.latitude <= c.latitude && c.latitude <= self.ne_corner.latitude &&
        self.sw_corner.longitude <= c.longitude && c.longitude <= self.ne_corner.longitude
    }
}

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Viewport {
        Viewport {
            width: width,
            height: height,
        }
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Position in screen pixels, origin top left, y pointing down.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint { x: x, y: y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// 8-bit RGB colour.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const LIGHT_GRAY: Rgb = Rgb(0xcc, 0xcc, 0xcc);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 128, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
}

/// Line colour and width in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: Rgb, width: f64) -> Stroke {
        Stroke {
            color: color,
            width: width,
        }
    }
}
