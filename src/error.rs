use thiserror::Error;

/// Which half of a coordinate an input field holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Axis::Latitude => write!(f, "latitude"),
            Axis::Longitude => write!(f, "longitude"),
        }
    }
}

/// Rejected field input. `index` is the 0-based row of the coordinate form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{axis} {} is not a number: {text:?}", .index + 1)]
    InvalidNumber { index: usize, axis: Axis, text: String },

    #[error("{axis} {} out of range: {value}", .index + 1)]
    OutOfRange { index: usize, axis: Axis, value: f64 },

    #[error("expected {expected} coordinates, found {found}")]
    WrongCount { expected: usize, found: usize },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid GeoJSON: {0}")]
    GeoJson(String),

    #[error("image encoding failed: {0}")]
    Image(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    Input(#[from] InputError),
}

pub type Result<T> = std::result::Result<T, Error>;
