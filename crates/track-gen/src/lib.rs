//! Synthetic running-track generation.
//!
//! This crate turns a start point, an end point, a set of checkpoints and a pace
//! window into a run payload: a continuous interpolated GPS route, split into
//! randomly sized tracks, with an average pace that stays inside the window.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use track_gen::prelude::*;
//!
//! let config = RunningConfig::default().with_start_time(1_700_000_000_000);
//! let rule = PointRule::default();
//! let mut rng = RngSource::new(rand::thread_rng());
//!
//! let run = RunGenerator::new(&TracingSink).generate(&config, &rule, &mut rng)?;
//! println!("{}", serde_json::to_string_pretty(&run.payload)?);
//! ```

pub mod config;
pub mod errors;
pub mod generators;
pub mod geodesy;
pub mod gpx;
pub mod logging;
pub mod random;

pub use errors::TrackGenError;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{Checkpoint, PaceRules, PointRule, RunningConfig};
    pub use crate::errors::TrackGenError;
    pub use crate::generators::{
        GeneratedRun, RunGenerator, RunRecord, Track, TrackStatus, assemble_route,
        build_payload, interpolate, segment,
    };
    pub use crate::geodesy::{Coordinate, TrackPoint, haversine_distance};
    pub use crate::logging::{LogLevel, LogSink, TracingSink};
    pub use crate::random::{RandomSource, RngSource, ScriptedSource};
}
