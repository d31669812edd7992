//! Route assembly: start, checkpoints and end joined into one timed point sequence.

use time::OffsetDateTime;

use crate::config::RunningConfig;
use crate::geodesy::{Coordinate, TrackPoint};

use super::interpolate::interpolate;

/// The continuous, timestamped route of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub points: Vec<TrackPoint>,
    /// Sum of the per-leg distances in meters.
    pub distance_m: f64,
}

/// Current wall-clock time in epoch milliseconds.
pub fn current_epoch_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Orders waypoints as start, checkpoints nearest-first, end.
///
/// Checkpoints at equal distance keep their original order.
pub fn order_waypoints(start: Coordinate, checkpoints: &[Coordinate], end: Coordinate) -> Vec<Coordinate> {
    let mut ordered: Vec<Coordinate> = checkpoints.iter().map(|c| c.rounded()).collect();
    ordered.sort_by(|a, b| start.distance_to(a).total_cmp(&start.distance_to(b)));

    let mut waypoints = Vec::with_capacity(ordered.len() + 2);
    waypoints.push(start);
    waypoints.extend(ordered);
    waypoints.push(end);
    waypoints
}

/// Interpolates every leg of the route and stamps the points.
///
/// The first point of a leg is dropped when it repeats the last point of the
/// previous leg. Timestamps start at the configured start time (or now) and
/// advance by exactly one interval per point.
pub fn assemble_route(config: &RunningConfig, checkpoints: &[Coordinate]) -> Route {
    let waypoints = order_waypoints(config.start(), checkpoints, config.end());
    let step_ms = i64::from(config.interval_seconds) * 1000;
    let mut locate_time_ms = config.start_time_epoch_ms.unwrap_or_else(current_epoch_ms);

    let mut points: Vec<TrackPoint> = Vec::new();
    let mut distance_m = 0.0;

    for pair in waypoints.windows(2) {
        let leg = interpolate(
            pair[0],
            pair[1],
            config.running_speed_mps,
            config.interval_seconds,
        );

        let skip = match (points.last(), leg.points.first()) {
            (Some(last), Some(first)) if last.lat_lng.same_position(first) => 1,
            _ => 0,
        };

        for coordinate in leg.points.into_iter().skip(skip) {
            points.push(TrackPoint::new(coordinate, locate_time_ms));
            locate_time_ms += step_ms;
        }

        distance_m += leg.distance_m;
    }

    Route { points, distance_m }
}
