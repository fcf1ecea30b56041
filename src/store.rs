use crate::types::{BoundingCorners, Coordinate};
use crate::util::bounding_corners;

/// Transitions of the coordinate store. Each one fully replaces the slice it names.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    /// Replace the field boundary; the bounding corners follow.
    SetFieldCoords(Vec<Coordinate>),
    /// Override the bounding corners directly.
    SetCorners { sw_corner: Coordinate, ne_corner: Coordinate },
    SetPointsOfInterest(Vec<Coordinate>),
}

/// Everything the input and map screens share for the session. Nothing is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    field_coords: Vec<Coordinate>,
    corners: BoundingCorners,
    points_of_interest: Vec<Coordinate>,
}

impl Default for AppState {
    /// The demo field in Kraków with a single point of interest. Corners start at zero until a
    /// field is submitted.
    fn default() -> Self {
        AppState {
            field_coords: vec![Coordinate::new(50.0653, 19.94544),
                               Coordinate::new(50.0635, 19.94544),
                               Coordinate::new(50.0653, 19.94376),
                               Coordinate::new(50.0635, 19.94376)],
            corners: BoundingCorners::default(),
            points_of_interest: vec![Coordinate::new(50.0643, 19.94444)],
        }
    }
}

impl AppState {
    pub fn empty() -> AppState {
        AppState {
            field_coords: Vec::new(),
            corners: BoundingCorners::default(),
            points_of_interest: Vec::new(),
        }
    }

    pub fn field_coords(&self) -> &[Coordinate] {
        &self.field_coords
    }

    pub fn corners(&self) -> BoundingCorners {
        self.corners
    }

    pub fn sw_corner(&self) -> Coordinate {
        self.corners.sw_corner
    }

    pub fn ne_corner(&self) -> Coordinate {
        self.corners.ne_corner
    }

    pub fn points_of_interest(&self) -> &[Coordinate] {
        &self.points_of_interest
    }

    /// Apply one transition, returning the next state.
    pub fn reduce(&self, action: StoreAction) -> AppState {
        let mut next = self.clone();
        match action {
            StoreAction::SetFieldCoords(coords) => {
                next.corners = bounding_corners(coords.iter());
                next.field_coords = coords;
            }
            StoreAction::SetCorners { sw_corner, ne_corner } => {
                next.corners = BoundingCorners {
                    sw_corner: sw_corner,
                    ne_corner: ne_corner,
                };
            }
            StoreAction::SetPointsOfInterest(points) => next.points_of_interest = points,
        }
        next
    }

    pub fn set_field_coords(&self, coords: Vec<Coordinate>) -> AppState {
        self.reduce(StoreAction::SetFieldCoords(coords))
    }

    pub fn set_corners(&self, sw_corner: Coordinate, ne_corner: Coordinate) -> AppState {
        self.reduce(StoreAction::SetCorners {
            sw_corner: sw_corner,
            ne_corner: ne_corner,
        })
    }

    pub fn set_points_of_interest(&self, points: Vec<Coordinate>) -> AppState {
        self.reduce(StoreAction::SetPointsOfInterest(points))
    }

    /// Rectangle through the bounding corners, counter-clockwise from the south-west corner.
    pub fn outline(&self) -> Vec<Coordinate> {
        let sw = self.corners.sw_corner;
        let ne = self.corners.ne_corner;
        vec![sw,
             Coordinate::new(sw.latitude, ne.longitude),
             ne,
             Coordinate::new(ne.latitude, sw.longitude)]
    }
}
