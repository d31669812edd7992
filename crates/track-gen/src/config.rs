//! Run configuration and portal pace rules.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackGenError};
use crate::geodesy::Coordinate;

/// Slowest speed a run may be generated at, in m/s.
pub const MIN_RUNNING_SPEED_MPS: f64 = 0.1;

/// Slowest pace a rule may allow, in s/km; matches [`MIN_RUNNING_SPEED_MPS`].
pub const MAX_PACE_S_PER_KM: f64 = 1000.0 / MIN_RUNNING_SPEED_MPS;

/// Caller-supplied parameters for one generated run.
///
/// Keys follow the uploader's saved config files (`START_LATITUDE`, ...).
/// Unrecognised keys such as cookies or endpoint URLs are ignored, and missing
/// keys fall back to [`RunningConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct RunningConfig {
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
    /// Target speed in meters per second.
    pub running_speed_mps: f64,
    /// Sampling interval between track points in seconds.
    pub interval_seconds: u32,
    /// Fixed start time in epoch milliseconds. `None` uses the wall clock.
    pub start_time_epoch_ms: Option<i64>,
    pub user_id: String,
}

impl Default for RunningConfig {
    fn default() -> Self {
        Self {
            start_latitude: 31.031599,
            start_longitude: 121.442938,
            end_latitude: 31.026400,
            end_longitude: 121.455100,
            running_speed_mps: 2.5,
            interval_seconds: 3,
            start_time_epoch_ms: None,
            user_id: String::new(),
        }
    }
}

impl RunningConfig {
    /// Loads a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn start(&self) -> Coordinate {
        Coordinate::new(self.start_latitude, self.start_longitude)
    }

    pub fn end(&self) -> Coordinate {
        Coordinate::new(self.end_latitude, self.end_longitude)
    }

    /// Returns a copy running at a different speed.
    pub fn with_speed(&self, running_speed_mps: f64) -> Self {
        Self {
            running_speed_mps,
            ..self.clone()
        }
    }

    /// Returns a copy with a fixed start time.
    pub fn with_start_time(&self, epoch_ms: i64) -> Self {
        Self {
            start_time_epoch_ms: Some(epoch_ms),
            ..self.clone()
        }
    }

    /// Checks everything generation would otherwise divide by or trip over.
    pub fn validate(&self) -> Result<()> {
        if !self.running_speed_mps.is_finite() || self.running_speed_mps < MIN_RUNNING_SPEED_MPS {
            return Err(TrackGenError::InvalidSpeed(self.running_speed_mps));
        }
        if self.interval_seconds == 0 {
            return Err(TrackGenError::InvalidInterval);
        }

        let fields = [
            ("START_LATITUDE", self.start_latitude, 90.0),
            ("START_LONGITUDE", self.start_longitude, 180.0),
            ("END_LATITUDE", self.end_latitude, 90.0),
            ("END_LONGITUDE", self.end_longitude, 180.0),
        ];
        for (field, value, limit) in fields {
            if !value.is_finite() || value.abs() > limit {
                return Err(TrackGenError::InvalidCoordinate { field, value });
            }
        }

        Ok(())
    }
}

/// A checkpoint entry of the portal's point rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// `"lon,lat"` in degrees.
    pub location: String,
    /// `"Y"` when the run must pass through this checkpoint.
    #[serde(default)]
    pub isneed: String,
}

impl Checkpoint {
    pub fn is_required(&self) -> bool {
        self.isneed == "Y"
    }

    /// Parses the `"lon,lat"` location into a rounded coordinate.
    pub fn coordinate(&self) -> Result<Coordinate> {
        let malformed = || TrackGenError::MalformedLocation(self.location.clone());

        let (lon, lat) = self.location.split_once(',').ok_or_else(malformed)?;
        let lon: f64 = lon.trim().parse().map_err(|_| malformed())?;
        let lat: f64 = lat.trim().parse().map_err(|_| malformed())?;

        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(malformed());
        }

        Ok(Coordinate::new(lat, lon).rounded())
    }
}

/// Pace window and run-type id of a point rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceRules {
    /// Fastest allowed pace in seconds per kilometer.
    pub spmin: f64,
    /// Slowest allowed pace in seconds per kilometer.
    pub spmax: f64,
    /// Run-type identifier.
    pub id: i64,
}

impl Default for PaceRules {
    fn default() -> Self {
        Self {
            spmin: 180.0,
            spmax: 540.0,
            id: 6,
        }
    }
}

impl PaceRules {
    pub fn validate(&self) -> Result<()> {
        let invalid = || TrackGenError::InvalidPaceWindow {
            spmin: self.spmin,
            spmax: self.spmax,
        };

        if !self.spmin.is_finite() || !self.spmax.is_finite() {
            return Err(invalid());
        }
        if self.spmin < 0.0 || self.spmax < 0.0 {
            return Err(invalid());
        }
        if self.spmin > MAX_PACE_S_PER_KM || self.spmax > MAX_PACE_S_PER_KM {
            return Err(invalid());
        }
        if self.spmin > 0.0 && self.spmax > 0.0 && self.spmin > self.spmax {
            return Err(invalid());
        }
        Ok(())
    }

    /// Speed bounds in m/s implied by the pace window.
    ///
    /// A zero bound on either side leaves that side open.
    pub fn speed_bounds(&self) -> (f64, f64) {
        let min_speed = if self.spmax > 0.0 {
            1000.0 / self.spmax
        } else {
            0.0
        };
        let max_speed = if self.spmin > 0.0 {
            1000.0 / self.spmin
        } else {
            f64::INFINITY
        };
        (min_speed, max_speed)
    }
}

/// Checkpoints and pace rules fetched for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointRule {
    pub points: Vec<Checkpoint>,
    pub rules: PaceRules,
}

/// The portal wraps the rule in a `{code, data}` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum PointRuleDocument {
    Envelope { data: PointRule },
    Bare(PointRule),
}

impl PointRule {
    /// Loads a point rule from a JSON file, bare or inside a `data` envelope.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let document: PointRuleDocument = serde_json::from_str(data)?;
        Ok(match document {
            PointRuleDocument::Envelope { data } => data,
            PointRuleDocument::Bare(rule) => rule,
        })
    }

    /// Coordinates of the checkpoints the run must pass through.
    pub fn required_checkpoints(&self) -> Result<Vec<Coordinate>> {
        self.points
            .iter()
            .filter(|p| p.is_required())
            .map(Checkpoint::coordinate)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = RunningConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.interval_seconds, 3);
        assert!(config.start_time_epoch_ms.is_none());
    }

    #[test]
    fn test_zero_speed_rejected() {
        let config = RunningConfig::default().with_speed(0.0);
        assert!(matches!(
            config.validate(),
            Err(TrackGenError::InvalidSpeed(_))
        ));

        let config = RunningConfig::default().with_speed(f64::NAN);
        assert!(matches!(
            config.validate(),
            Err(TrackGenError::InvalidSpeed(_))
        ));
    }

    #[test]
    fn test_crawling_speed_rejected() {
        let config = RunningConfig::default().with_speed(1e-6);
        assert!(matches!(
            config.validate(),
            Err(TrackGenError::InvalidSpeed(_))
        ));

        let config = RunningConfig::default().with_speed(MIN_RUNNING_SPEED_MPS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = RunningConfig {
            interval_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrackGenError::InvalidInterval)
        ));
    }

    #[test]
    fn test_out_of_range_coordinate_rejected() {
        let config = RunningConfig {
            end_latitude: 91.0,
            ..Default::default()
        };
        match config.validate() {
            Err(TrackGenError::InvalidCoordinate { field, .. }) => {
                assert_eq!(field, "END_LATITUDE")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_with_speed_leaves_original_untouched() {
        let original = RunningConfig::default();
        let adjusted = original.with_speed(4.0);
        assert_eq!(original.running_speed_mps, 2.5);
        assert_eq!(adjusted.running_speed_mps, 4.0);
        assert_eq!(adjusted.start(), original.start());
    }

    #[test]
    fn test_config_json_merges_defaults_and_ignores_unknown_keys() {
        let json = r#"{
            "COOKIE": "keepalive=abc",
            "USER_ID": "u-123",
            "RUNNING_SPEED_MPS": 3.2,
            "START_TIME_EPOCH_MS": 1700000000000,
            "UPLOAD_URL": "https://example.invalid/upload"
        }"#;
        let config: RunningConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.user_id, "u-123");
        assert_eq!(config.running_speed_mps, 3.2);
        assert_eq!(config.start_time_epoch_ms, Some(1_700_000_000_000));
        assert_eq!(config.start_latitude, 31.031599);
        assert_eq!(config.interval_seconds, 3);
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"INTERVAL_SECONDS": 5, "START_TIME_EPOCH_MS": null}}"#).unwrap();

        let config = RunningConfig::load(file.path()).unwrap();
        assert_eq!(config.interval_seconds, 5);
        assert!(config.start_time_epoch_ms.is_none());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = RunningConfig::load("/nonexistent/track-gen/config.json");
        assert!(matches!(result, Err(TrackGenError::Io(_))));
    }

    #[test]
    fn test_checkpoint_parsing() {
        let checkpoint = Checkpoint {
            location: "121.4429381234, 31.0315991234".into(),
            isneed: "Y".into(),
        };
        let coord = checkpoint.coordinate().unwrap();
        assert_eq!(coord, Coordinate::new(31.031599, 121.442938));
    }

    #[test]
    fn test_malformed_checkpoint_fails_fast() {
        for location in ["", "121.44", "abc,31.0", "121.44,north", "121.44,95.0"] {
            let checkpoint = Checkpoint {
                location: location.into(),
                isneed: "Y".into(),
            };
            assert!(
                matches!(
                    checkpoint.coordinate(),
                    Err(TrackGenError::MalformedLocation(_))
                ),
                "location {location:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_required_checkpoints_filters_isneed() {
        let rule = PointRule {
            points: vec![
                Checkpoint {
                    location: "121.45,31.03".into(),
                    isneed: "Y".into(),
                },
                Checkpoint {
                    location: "121.46,31.04".into(),
                    isneed: "N".into(),
                },
                Checkpoint {
                    location: "not a location".into(),
                    isneed: "N".into(),
                },
            ],
            rules: PaceRules::default(),
        };

        let required = rule.required_checkpoints().unwrap();
        assert_eq!(required, vec![Coordinate::new(31.03, 121.45)]);
    }

    #[test]
    fn test_point_rule_envelope_and_bare() {
        let bare = r#"{"rules": {"spmin": 200, "spmax": 480, "id": 3}, "points": []}"#;
        let wrapped = r#"{"code": 0, "data": {"rules": {"spmin": 200, "spmax": 480, "id": 3}}}"#;

        let a = PointRule::from_json(bare).unwrap();
        let b = PointRule::from_json(wrapped).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.rules.spmin, 200.0);
        assert_eq!(a.rules.id, 3);
    }

    #[test]
    fn test_point_rule_defaults() {
        let rule = PointRule::from_json("{}").unwrap();
        assert_eq!(rule.rules, PaceRules::default());
        assert!(rule.points.is_empty());
    }

    #[test]
    fn test_pace_window_validation() {
        let inverted = PaceRules {
            spmin: 600.0,
            spmax: 300.0,
            id: 6,
        };
        assert!(inverted.validate().is_err());
        assert!(PaceRules::default().validate().is_ok());

        let glacial = PaceRules {
            spmin: 0.0,
            spmax: 1e9,
            id: 6,
        };
        assert!(glacial.validate().is_err());
        let too_slow_minimum = PaceRules {
            spmin: 1e9,
            spmax: 0.0,
            id: 6,
        };
        assert!(too_slow_minimum.validate().is_err());
    }

    #[test]
    fn test_speed_bounds() {
        let (min_speed, max_speed) = PaceRules::default().speed_bounds();
        assert!((min_speed - 1000.0 / 540.0).abs() < 1e-12);
        assert!((max_speed - 1000.0 / 180.0).abs() < 1e-12);

        let open = PaceRules {
            spmin: 0.0,
            spmax: 0.0,
            id: 6,
        };
        assert_eq!(open.speed_bounds(), (0.0, f64::INFINITY));
    }
}
