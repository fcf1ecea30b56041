use crate::types::{BoundingCorners, Coordinate, ScreenPoint, Viewport};

/// Screen pixels per degree at scale 1.
pub const DEFAULT_PIXELS_PER_DEGREE: f64 = 1000.0;

/// Local flat-earth projection around a reference coordinate, which lands on the viewport centre.
/// One degree of latitude and one degree of longitude get the same pixel length, so the picture
/// is only faithful for small extents near the reference. No correction is made for longitude
/// compression away from the equator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub reference: Coordinate,
    pub viewport: Viewport,
    pub scale: f64,
    pub pixels_per_degree: f64,
}

impl Projection {
    pub fn new(reference: Coordinate, viewport: Viewport, scale: f64, pixels_per_degree: f64)
               -> Projection {
        Projection {
            reference: reference,
            viewport: viewport,
            scale: scale,
            pixels_per_degree: pixels_per_degree,
        }
    }

    /// Pixels per degree after zoom.
    #[inline]
    pub fn factor(&self) -> f64 {
        self.pixels_per_degree * self.scale
    }

    pub fn project(&self, c: &Coordinate) -> ScreenPoint {
        let f = self.factor();
        ScreenPoint {
            x: self.viewport.width / 2.0 + (c.longitude - self.reference.longitude) * f,
            y: self.viewport.height / 2.0 - (c.latitude - self.reference.latitude) * f,
        }
    }

    pub fn unproject(&self, p: &ScreenPoint) -> Coordinate {
        let f = self.factor();
        Coordinate {
            latitude: self.reference.latitude - (p.y - self.viewport.height / 2.0) / f,
            longitude: self.reference.longitude + (p.x - self.viewport.width / 2.0) / f,
        }
    }

    /// Geographic rectangle covered by the viewport.
    pub fn visible_bounds(&self) -> BoundingCorners {
        BoundingCorners {
            sw_corner: self.unproject(&ScreenPoint::new(0.0, self.viewport.height)),
            ne_corner: self.unproject(&ScreenPoint::new(self.viewport.width, 0.0)),
        }
    }
}
