//! Straight-leg interpolation between two waypoints.

use crate::geodesy::Coordinate;

/// Drift (in degrees) tolerated before the final sample is snapped to the end.
const END_SNAP_EPSILON: f64 = 1e-10;

/// Points sampled along one leg, without timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub points: Vec<Coordinate>,
    /// Great-circle length in meters.
    pub distance_m: f64,
    /// Ideal running time in whole seconds, rounded up.
    pub duration_s: u64,
}

/// Samples a leg from `start` to `end` every `interval_s` seconds at `speed_mps`.
///
/// Both endpoints are rounded to stored precision first. Intermediate points are
/// linear in radian space, which is a chord approximation that is accurate at
/// the scale of a campus run. The last point is always exactly the rounded end.
///
/// Callers validate `speed_mps > 0` and `interval_s > 0`.
pub fn interpolate(start: Coordinate, end: Coordinate, speed_mps: f64, interval_s: u32) -> Leg {
    let start = start.rounded();
    let end = end.rounded();

    let distance_m = start.distance_to(&end);
    let duration = distance_m / speed_mps;
    let duration_s = duration.ceil() as u64;

    let steps = if distance_m == 0.0 {
        0
    } else {
        ((duration / f64::from(interval_s)).ceil() as usize).max(1)
    };

    if steps == 0 {
        return Leg {
            points: vec![start],
            distance_m,
            duration_s,
        };
    }

    let (start_lat, start_lon) = (start.latitude.to_radians(), start.longitude.to_radians());
    let (end_lat, end_lon) = (end.latitude.to_radians(), end.longitude.to_radians());

    let mut points: Vec<Coordinate> = (0..=steps)
        .map(|i| {
            let fraction = i as f64 / steps as f64;
            let lat = start_lat + fraction * (end_lat - start_lat);
            let lon = start_lon + fraction * (end_lon - start_lon);
            Coordinate::new(lat.to_degrees(), lon.to_degrees()).rounded()
        })
        .collect();

    if let Some(last) = points.last_mut()
        && ((last.latitude - end.latitude).abs() > END_SNAP_EPSILON
            || (last.longitude - end.longitude).abs() > END_SNAP_EPSILON)
    {
        *last = end;
    }

    Leg {
        points,
        distance_m,
        duration_s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Coordinate = Coordinate::new(31.031599, 121.442938);
    const END: Coordinate = Coordinate::new(31.026400, 121.455100);

    #[test]
    fn test_zero_distance_leg() {
        let leg = interpolate(START, START, 2.5, 3);
        assert_eq!(leg.points, vec![START.rounded()]);
        assert_eq!(leg.distance_m, 0.0);
        assert_eq!(leg.duration_s, 0);
    }

    #[test]
    fn test_leg_ends_on_rounded_end() {
        let cases = [
            (START, END, 2.5, 3),
            (END, START, 4.0, 1),
            (
                Coordinate::new(31.0000004, 121.0000004),
                Coordinate::new(31.0123456789, 121.0098765432),
                3.3,
                7,
            ),
        ];

        for (start, end, speed, interval) in cases {
            let leg = interpolate(start, end, speed, interval);
            let last = leg.points.last().unwrap();
            let expected = end.rounded();
            assert!((last.latitude - expected.latitude).abs() < 1e-6);
            assert!((last.longitude - expected.longitude).abs() < 1e-6);
            assert_eq!(leg.points.first().copied(), Some(start.rounded()));
        }
    }

    #[test]
    fn test_step_count_follows_duration() {
        let leg = interpolate(START, END, 2.5, 3);
        let expected_steps = (leg.distance_m / 2.5 / 3.0).ceil() as usize;
        assert_eq!(leg.points.len(), expected_steps + 1);
        assert_eq!(leg.duration_s, (leg.distance_m / 2.5).ceil() as u64);
    }

    #[test]
    fn test_short_leg_has_at_least_one_step() {
        let end = Coordinate::new(START.latitude + 0.000001, START.longitude);
        let leg = interpolate(START, end, 10.0, 60);
        assert_eq!(leg.points.len(), 2);
        assert!(leg.distance_m > 0.0);
        assert_eq!(leg.duration_s, 1);
    }

    #[test]
    fn test_points_are_stored_at_fixed_precision() {
        let leg = interpolate(START, END, 2.5, 3);
        for point in &leg.points {
            assert_eq!(*point, point.rounded());
        }
    }

    #[test]
    fn test_interpolation_is_bit_identical_across_calls() {
        let a = interpolate(START, END, 2.7, 3);
        let b = interpolate(START, END, 2.7, 3);
        assert_eq!(a.distance_m.to_bits(), b.distance_m.to_bits());
        assert_eq!(a.points.len(), b.points.len());
        for (p, q) in a.points.iter().zip(&b.points) {
            assert_eq!(p.latitude.to_bits(), q.latitude.to_bits());
            assert_eq!(p.longitude.to_bits(), q.longitude.to_bits());
        }
    }
}
