//! The generation pipeline.
//!
//! - [`interpolate`]: sample one straight leg between two waypoints
//! - [`assemble_route`]: join start, checkpoints and end into one timed route
//! - [`segment`]: split the route into randomly sized, randomly flagged tracks
//! - [`build_payload`]: total the tracks and clamp the pace into the rule window
//! - [`RunGenerator`]: run all of the above for one config and point rule

pub mod interpolate;
pub mod payload;
pub mod route;
pub mod run;
pub mod segmenter;

pub use interpolate::{Leg, interpolate};
pub use payload::{Pace, Payload, RunRecord, build_payload};
pub use route::{Route, assemble_route, current_epoch_ms};
pub use run::{GeneratedRun, RunGenerator, clamp_speed, format_epoch_ms};
pub use segmenter::{DEFAULT_MIN_SEGMENT_POINTS, Track, TrackStatus, segment};
