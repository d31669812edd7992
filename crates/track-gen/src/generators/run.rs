//! End-to-end run generation.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::{PaceRules, PointRule, RunningConfig};
use crate::errors::Result;
use crate::logging::{LogLevel, LogSink};
use crate::random::RandomSource;

use super::payload::{Pace, RunRecord, build_payload};
use super::route::{Route, assemble_route};
use super::segmenter::{DEFAULT_MIN_SEGMENT_POINTS, segment};

/// Everything produced for one run.
#[derive(Debug, Clone)]
pub struct GeneratedRun {
    /// Upload body: exactly one record.
    pub payload: Vec<RunRecord>,
    pub distance_m: f64,
    pub duration_s: u64,
    pub pace: Pace,
    /// Speed the route was generated at, after clamping to the pace window.
    pub speed_mps: f64,
    /// The assembled route before segmentation.
    pub route: Route,
}

/// Returns `config` with its speed moved inside the rule's pace window.
///
/// The input is never modified; a warning is logged when the speed changes.
pub fn clamp_speed(config: &RunningConfig, rules: &PaceRules, log: &dyn LogSink) -> RunningConfig {
    let (min_speed, max_speed) = rules.speed_bounds();
    let speed = config.running_speed_mps;

    let adjusted = if speed < min_speed {
        log.warning(&format!(
            "Adjusting running speed from {speed:.2} m/s to minimum allowed {min_speed:.2} m/s"
        ));
        min_speed
    } else if speed > max_speed {
        log.warning(&format!(
            "Adjusting running speed from {speed:.2} m/s to maximum allowed {max_speed:.2} m/s"
        ));
        max_speed
    } else {
        speed
    };

    log.info(&format!(
        "Pace rule: {:.0}'-{:.0}' min/km. Using speed: {adjusted:.2} m/s",
        rules.spmin / 60.0,
        rules.spmax / 60.0
    ));

    config.with_speed(adjusted)
}

/// Drives the generation pipeline: route, tracks, payload.
pub struct RunGenerator<'a> {
    log: &'a dyn LogSink,
    min_segment_points: usize,
}

impl<'a> RunGenerator<'a> {
    pub fn new(log: &'a dyn LogSink) -> Self {
        Self {
            log,
            min_segment_points: DEFAULT_MIN_SEGMENT_POINTS,
        }
    }

    /// Sets the minimum number of points per track.
    pub fn with_min_segment_points(mut self, points: usize) -> Self {
        self.min_segment_points = points.max(1);
        self
    }

    /// Generates one run for `config` under `rule`.
    ///
    /// Configuration and checkpoint errors are reported before any point is
    /// generated.
    pub fn generate(
        &self,
        config: &RunningConfig,
        rule: &PointRule,
        rng: &mut dyn RandomSource,
    ) -> Result<GeneratedRun> {
        config.validate()?;
        rule.rules.validate()?;
        let checkpoints = rule.required_checkpoints()?;

        let config = clamp_speed(config, &rule.rules, self.log);
        self.log.info(&format!(
            "Routing through {} required checkpoint(s)",
            checkpoints.len()
        ));

        let route = assemble_route(&config, &checkpoints);
        let tracks = segment(&route.points, self.min_segment_points, rng);
        let built = build_payload(&config, tracks, &rule.rules, self.log);

        let track_count = built.records.first().map_or(0, |r| r.tracks.len());
        self.log.info(&format!("Generated {track_count} track segments."));
        self.log.info(&format!(
            "Total simulated distance: {:.2} meters",
            built.distance_m
        ));
        self.log.info(&format!(
            "Total simulated duration: {} seconds",
            built.duration_s
        ));
        self.log.info(&format!(
            "Simulated average pace: {} min/km",
            built.pace.minutes_per_km
        ));
        if let Some(first) = route.points.first() {
            self.log.info(&format!(
                "Run start time: {} (epoch ms {})",
                format_epoch_ms(first.locate_time_ms),
                first.locate_time_ms
            ));
        }
        self.log.log(LogLevel::Success, "Running data generated.");

        Ok(GeneratedRun {
            payload: built.records,
            distance_m: built.distance_m,
            duration_s: built.duration_s,
            pace: built.pace,
            speed_mps: config.running_speed_mps,
            route,
        })
    }
}

/// Formats epoch milliseconds as RFC 3339 UTC, or the raw number if out of range.
pub fn format_epoch_ms(epoch_ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_ms) * 1_000_000)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| epoch_ms.to_string())
}
