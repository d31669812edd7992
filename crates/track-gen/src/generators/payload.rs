//! Run totals, pace-window compliance and the upload record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Checkpoint, PaceRules, RunningConfig};
use crate::logging::LogSink;

use super::segmenter::Track;

/// Run-type id the portal hands out but does not accept back.
const RULE_RUN_TYPE: i64 = 6;
/// Run-type id submitted in its place.
const SUBMITTED_RUN_TYPE: i64 = 9;

/// One run as uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Average heart rate; not simulated.
    pub fravg: u32,
    /// Run-type id.
    pub id: i64,
    /// Session id.
    pub sid: String,
    pub signpoints: Vec<Checkpoint>,
    /// Average pace in whole minutes per kilometer.
    pub spavg: u32,
    pub state: String,
    pub tracks: Vec<Track>,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Average pace of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pace {
    /// Unrounded pace in seconds per kilometer, before clamping.
    pub raw_s_per_km: f64,
    /// Reported pace in whole minutes per kilometer, after clamping.
    pub minutes_per_km: u32,
}

impl Pace {
    /// Computes the pace of `distance_m` covered in `duration_s`.
    pub fn of(distance_m: f64, duration_s: u64) -> Self {
        if distance_m <= 0.0 || duration_s == 0 {
            return Self {
                raw_s_per_km: 0.0,
                minutes_per_km: 0,
            };
        }

        let raw_s_per_km = duration_s as f64 / (distance_m / 1000.0);
        Self {
            raw_s_per_km,
            minutes_per_km: (raw_s_per_km / 60.0).round() as u32,
        }
    }

    /// Moves the reported pace inside the rule window, logging a warning if it moved.
    pub fn clamp_to(self, rules: &PaceRules, log: &dyn LogSink) -> Self {
        let reported_s = f64::from(self.minutes_per_km) * 60.0;

        if rules.spmin > 0.0 && (self.raw_s_per_km < rules.spmin || reported_s < rules.spmin) {
            log.warning(&format!(
                "Calculated pace {} min/km ({:.0} s/km) is faster than {:.0} min/km ({:.0} s/km). Adjusting to minimum allowed pace.",
                self.minutes_per_km,
                self.raw_s_per_km,
                rules.spmin / 60.0,
                rules.spmin
            ));
            return Self {
                minutes_per_km: (rules.spmin / 60.0).ceil() as u32,
                ..self
            };
        }

        if rules.spmax > 0.0 && (self.raw_s_per_km > rules.spmax || reported_s > rules.spmax) {
            log.warning(&format!(
                "Calculated pace {} min/km ({:.0} s/km) is slower than {:.0} min/km ({:.0} s/km). Adjusting to maximum allowed pace.",
                self.minutes_per_km,
                self.raw_s_per_km,
                rules.spmax / 60.0,
                rules.spmax
            ));
            return Self {
                minutes_per_km: (rules.spmax / 60.0).floor() as u32,
                ..self
            };
        }

        self
    }
}

/// The upload body plus the totals reported back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    /// Always exactly one record.
    pub records: Vec<RunRecord>,
    /// Sum of the track distances in meters.
    pub distance_m: f64,
    /// Seconds from the first to the last point.
    pub duration_s: u64,
    pub pace: Pace,
}

/// Maps the rule's run-type id to the id submitted with the run.
pub fn submitted_run_type(rules: &PaceRules) -> i64 {
    if rules.id == RULE_RUN_TYPE {
        SUBMITTED_RUN_TYPE
    } else {
        rules.id
    }
}

/// Elapsed seconds between the first and last point across all tracks.
pub fn elapsed_seconds(tracks: &[Track]) -> u64 {
    let first = tracks
        .first()
        .and_then(|t| t.points.first())
        .map(|p| p.locate_time_ms);
    let last = tracks
        .last()
        .and_then(|t| t.points.last())
        .map(|p| p.locate_time_ms);

    match (first, last) {
        (Some(first), Some(last)) => ((last - first).max(0) as u64).div_ceil(1000),
        _ => 0,
    }
}

/// Totals the tracks, brings the pace inside the rule window, and wraps
/// everything into the single run record the portal expects.
pub fn build_payload(
    config: &RunningConfig,
    tracks: Vec<Track>,
    rules: &PaceRules,
    log: &dyn LogSink,
) -> Payload {
    let distance_m: f64 = tracks.iter().map(|t| t.distance).sum();
    let duration_s = elapsed_seconds(&tracks);

    let pace = Pace::of(distance_m, duration_s);
    let pace = if distance_m > 0.0 {
        pace.clamp_to(rules, log)
    } else {
        pace
    };

    let record = RunRecord {
        fravg: 0,
        id: submitted_run_type(rules),
        sid: Uuid::new_v4().to_string(),
        signpoints: Vec::new(),
        spavg: pace.minutes_per_km,
        state: "0".to_string(),
        tracks,
        user_id: config.user_id.clone(),
    };

    Payload {
        records: vec![record],
        distance_m,
        duration_s,
        pace,
    }
}
