use std::f64;

use crate::types::{BoundingCorners, Coordinate};

/// Compute the length in meters of one degree latitude and longitude at given latitude degree.
pub fn lat_lon(lat: f64) -> (f64, f64) {
    // Port of http://msi.nga.mil/MSISiteContent/StaticFiles/Calculators/degree.html
    let lat = lat * f64::consts::PI * 2.0 / 360.0;
    let m1 = 111132.92;
    let m2 = -559.82;
    let m3 = 1.175;
    let m4 = -0.0023;
    let p1 = 111412.84;
    let p2 = -93.5;
    let p3 = 0.118;

    // Calculate the length of a degree of latitude and longitude in meters
    let latlen = m1 + (m2 * (2.0 * lat).cos()) + (m3 * (4.0 * lat).cos()) +
                 (m4 * (6.0 * lat).cos());
    let longlen = (p1 * lat.cos()) + (p2 * (3.0 * lat).cos()) + (p3 * (5.0 * lat).cos());
    (latlen, longlen)
}

/// Approximate distance in meters between two nearby coordinates, using the degree lengths at
/// their mean latitude. Good enough for the few meters a GPS filter cares about.
pub fn distance_m(a: &Coordinate, b: &Coordinate) -> f64 {
    let (lat_len, lon_len) = lat_lon((a.latitude + b.latitude) / 2.0);
    let dy = (b.latitude - a.latitude) * lat_len;
    let dx = (b.longitude - a.longitude) * lon_len;
    dx.hypot(dy)
}

/// Find the bounding corners over an iterator of coordinates.
/// The scan is seeded with inverted extrema so the first coordinate always moves both corners.
/// Coordinates with NaN components never win a comparison and leave the corners untouched.
pub fn bounding_corners<'a, I: Iterator<Item = &'a Coordinate>>(iter: I) -> BoundingCorners {
    iter.fold(BoundingCorners {
                  sw_corner: Coordinate::new(90.0, 180.0),
                  ne_corner: Coordinate::new(-90.0, -180.0),
              },
              |mut b, c| {
        if c.latitude < b.sw_corner.latitude {
            b.sw_corner.latitude = c.latitude;
        }
        if c.latitude > b.ne_corner.latitude {
            b.ne_corner.latitude = c.latitude;
        }
        if c.longitude < b.sw_corner.longitude {
            b.sw_corner.longitude = c.longitude;
        }
        if c.longitude > b.ne_corner.longitude {
            b.ne_corner.longitude = c.longitude;
        }
        b
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_lengths_near_equator() {
        let (lat_len, lon_len) = lat_lon(0.0);
        assert!((lat_len - 110574.0).abs() < 5.0);
        assert!((lon_len - 111320.0).abs() < 5.0);
    }

    #[test]
    fn longitude_degree_shrinks_with_latitude() {
        let (_, at_equator) = lat_lon(0.0);
        let (_, at_krakow) = lat_lon(50.0);
        assert!(at_krakow < at_equator * 0.7);
    }

    #[test]
    fn short_distance_is_meters() {
        let a = Coordinate::new(50.0653, 19.94544);
        let b = Coordinate::new(50.0635, 19.94544);
        let d = distance_m(&a, &b);
        assert!(d > 195.0 && d < 205.0, "got {}", d);
        assert_eq!(distance_m(&a, &a), 0.0);
    }

    #[test]
    fn corners_of_field() {
        let field = [Coordinate::new(50.0653, 19.94544),
                     Coordinate::new(50.0635, 19.94544),
                     Coordinate::new(50.0653, 19.94376),
                     Coordinate::new(50.0635, 19.94376)];
        let b = bounding_corners(field.iter());
        assert_eq!(b.sw_corner, Coordinate::new(50.0635, 19.94376));
        assert_eq!(b.ne_corner, Coordinate::new(50.0653, 19.94544));
    }

    #[test]
    fn corners_contain_every_input() {
        let field = [Coordinate::new(-12.5, 170.0),
                     Coordinate::new(33.0, -179.5),
                     Coordinate::new(0.0, 0.0),
                     Coordinate::new(89.9, 45.0)];
        let b = bounding_corners(field.iter());
        for c in &field {
            assert!(b.contains(c), "{:?} outside {:?}", c, b);
        }
        assert_eq!(b.sw_corner, Coordinate::new(-12.5, -179.5));
        assert_eq!(b.ne_corner, Coordinate::new(89.9, 170.0));
    }

    #[test]
    fn single_point_collapses_rectangle() {
        let p = [Coordinate::new(10.0, 20.0)];
        let b = bounding_corners(p.iter());
        assert_eq!(b.sw_corner, b.ne_corner);
    }

    #[test]
    fn empty_input_keeps_inverted_seed() {
        let empty: [Coordinate; 0] = [];
        let b = bounding_corners(empty.iter());
        assert_eq!(b.sw_corner, Coordinate::new(90.0, 180.0));
        assert_eq!(b.ne_corner, Coordinate::new(-90.0, -180.0));
    }
}
