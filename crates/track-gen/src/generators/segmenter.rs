//! Splitting a route into randomly sized, randomly flagged tracks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geodesy::{TrackPoint, path_distance};
use crate::random::RandomSource;

/// Smallest number of points in any track but the last.
pub const DEFAULT_MIN_SEGMENT_POINTS: usize = 5;

/// Movement status reported for a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackStatus {
    Normal,
    Stop,
    Invalid,
}

impl TrackStatus {
    /// Draws a status: 80% normal, 10% invalid, 10% stop.
    pub fn draw(rng: &mut dyn RandomSource) -> Self {
        let value = rng.next_f64();
        if value < 0.8 {
            TrackStatus::Normal
        } else if value < 0.9 {
            TrackStatus::Invalid
        } else {
            TrackStatus::Stop
        }
    }

    /// Numeric state code sent alongside the status.
    ///
    /// `stop` shares code "0" with `normal`; only `invalid` is "2".
    pub fn code(self) -> &'static str {
        match self {
            TrackStatus::Normal | TrackStatus::Stop => "0",
            TrackStatus::Invalid => "2",
        }
    }
}

/// One contiguous chunk of the route as reported to the portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub counts: usize,
    /// Meters.
    pub distance: f64,
    /// Whole seconds.
    pub duration: u64,
    pub points: Vec<TrackPoint>,
    pub status: TrackStatus,
    pub trid: String,
    pub tstate: String,
    /// First point time in epoch seconds.
    pub stime: i64,
    /// Last point time in epoch seconds.
    pub etime: i64,
}

impl Track {
    fn from_points(points: Vec<TrackPoint>, status: TrackStatus) -> Self {
        let distance = path_distance(points.iter().map(|p| &p.lat_lng));

        let first_ms = points.first().map_or(0, |p| p.locate_time_ms);
        let last_ms = points.last().map_or(0, |p| p.locate_time_ms);
        let duration = ((last_ms - first_ms).max(0) as u64).div_ceil(1000);

        Self {
            counts: points.len(),
            distance,
            duration,
            points,
            status,
            trid: Uuid::new_v4().to_string(),
            tstate: status.code().to_string(),
            stime: first_ms.div_euclid(1000),
            etime: last_ms.div_euclid(1000),
        }
    }
}

/// Partitions `points` into tracks of random length.
///
/// While more than `min_segment_points` remain, each track takes a length drawn
/// uniformly from `min..=max(min, remaining / 3)`; the rest becomes the final
/// track. The concatenated track points always equal the input.
pub fn segment(
    points: &[TrackPoint],
    min_segment_points: usize,
    rng: &mut dyn RandomSource,
) -> Vec<Track> {
    let min_segment_points = min_segment_points.max(1);
    let mut tracks = Vec::new();
    let mut start = 0;

    while start < points.len() {
        let remaining = points.len() - start;
        let length = if remaining <= min_segment_points {
            remaining
        } else {
            rng.range_inclusive(min_segment_points, min_segment_points.max(remaining / 3))
        };

        let chunk = points[start..start + length].to_vec();
        start += length;

        let status = TrackStatus::draw(rng);
        tracks.push(Track::from_points(chunk, status));
    }

    tracks
}
