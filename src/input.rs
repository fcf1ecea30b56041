use log::warn;

use crate::error::{Axis, InputError};
use crate::store::AppState;
use crate::transcript::coordinates_from_transcript;
use crate::types::Coordinate;

/// Number of corner points a field is entered with.
pub const FIELD_POINTS: usize = 4;

/// Raw text of one latitude/longitude row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordinateInput {
    pub latitude: String,
    pub longitude: String,
}

/// Parse one text field. Locale-free: `.` is the only decimal separator.
pub fn parse_degrees(text: &str, index: usize, axis: Axis) -> Result<f64, InputError> {
    let value: f64 = text.trim().parse().map_err(|_| {
        InputError::InvalidNumber {
            index: index,
            axis: axis,
            text: text.to_string(),
        }
    })?;
    if !value.is_finite() {
        return Err(InputError::InvalidNumber {
            index: index,
            axis: axis,
            text: text.to_string(),
        });
    }
    let limit = match axis {
        Axis::Latitude => 90.0,
        Axis::Longitude => 180.0,
    };
    if value.abs() > limit {
        return Err(InputError::OutOfRange {
            index: index,
            axis: axis,
            value: value,
        });
    }
    Ok(value)
}

impl CoordinateInput {
    pub fn from_coordinate(c: &Coordinate) -> CoordinateInput {
        CoordinateInput {
            latitude: c.latitude.to_string(),
            longitude: c.longitude.to_string(),
        }
    }

    pub fn parse(&self, index: usize) -> Result<Coordinate, InputError> {
        Ok(Coordinate {
            latitude: parse_degrees(&self.latitude, index, Axis::Latitude)?,
            longitude: parse_degrees(&self.longitude, index, Axis::Longitude)?,
        })
    }
}

/// The four-row coordinate entry form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldForm {
    rows: [CoordinateInput; FIELD_POINTS],
}

impl FieldForm {
    /// Pre-fill the rows from the stored field, leaving rows without a stored point blank.
    pub fn from_state(state: &AppState) -> FieldForm {
        let mut form = FieldForm::default();
        for (row, c) in form.rows.iter_mut().zip(state.field_coords()) {
            *row = CoordinateInput::from_coordinate(c);
        }
        form
    }

    pub fn rows(&self) -> &[CoordinateInput] {
        &self.rows
    }

    /// Replace the text of one field. Out-of-range rows are ignored.
    pub fn set(&mut self, index: usize, axis: Axis, text: &str) {
        if let Some(row) = self.rows.get_mut(index) {
            match axis {
                Axis::Latitude => row.latitude = text.to_string(),
                Axis::Longitude => row.longitude = text.to_string(),
            }
        }
    }

    /// Parse every row. The first bad field rejects the whole form.
    pub fn parse(&self) -> Result<Vec<Coordinate>, InputError> {
        self.rows.iter().enumerate().map(|(i, row)| row.parse(i)).collect()
    }

    /// Parse the form and store it: the field is replaced and the corners recomputed. Nothing
    /// is stored when any field is rejected.
    pub fn submit(&self, state: &AppState) -> Result<AppState, InputError> {
        match self.parse() {
            Ok(coords) => Ok(state.set_field_coords(coords)),
            Err(e) => {
                warn!("rejected field input: {}", e);
                Err(e)
            }
        }
    }

    /// Fill rows in order from a dictated transcript. Exactly four coordinates are required so a
    /// half-heard transcript never leaves the form partly overwritten.
    pub fn fill_from_transcript(&mut self, transcript: &str) -> Result<(), InputError> {
        let coords = coordinates_from_transcript(transcript)?;
        if coords.len() != FIELD_POINTS {
            return Err(InputError::WrongCount {
                expected: FIELD_POINTS,
                found: coords.len(),
            });
        }
        for (row, c) in self.rows.iter_mut().zip(&coords) {
            *row = CoordinateInput::from_coordinate(c);
        }
        Ok(())
    }
}
