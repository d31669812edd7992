use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackGenError {
    #[error("Running speed must be at least 0.1 m/s, got {0}")]
    InvalidSpeed(f64),

    #[error("Sampling interval must be at least one second")]
    InvalidInterval,

    #[error("Invalid coordinate for {field}: {value}")]
    InvalidCoordinate { field: &'static str, value: f64 },

    #[error("Malformed checkpoint location {0:?}, expected \"lon,lat\"")]
    MalformedLocation(String),

    #[error("Invalid pace window: spmin {spmin} s/km, spmax {spmax} s/km")]
    InvalidPaceWindow { spmin: f64, spmax: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = TrackGenError> = std::result::Result<T, E>;
