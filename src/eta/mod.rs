//! # Distance & ETA Arithmetic
//!
//! Pure, stateless functions deriving distances and remaining time from
//! geographic coordinates. Nothing here is stored; every value is computed on
//! demand from the route and an assumed speed, or from wall-clock timestamps.

use crate::model::Waypoint;
use std::time::{Duration, SystemTime};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Sentinel returned by [`format_remaining_eta`] once the target instant has passed.
pub const ARRIVED: &str = "已送达";

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Great-circle surface distance in meters between two points.
pub fn haversine(a: &Waypoint, b: &Waypoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    let c = 2.0 * h.min(1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Sum of consecutive [`haversine`] distances; 0 for fewer than two points.
pub fn total_distance(points: &[Waypoint]) -> f64 {
    points.windows(2).map(|pair| haversine(&pair[0], &pair[1])).sum()
}

/// Distance still to travel from `points[index]` to the end of the route.
pub fn remaining_distance(points: &[Waypoint], index: usize) -> f64 {
    points.get(index..).map(total_distance).unwrap_or(0.0)
}

/// Seconds needed to cover the whole route at `speed_mps`.
///
/// Returns 0 when the speed is not positive or the route has no length.
pub fn eta_seconds(points: &[Waypoint], speed_mps: f64) -> f64 {
    seconds_for(total_distance(points), speed_mps)
}

/// Seconds needed to cover the rest of the route starting at `index`.
pub fn remaining_eta_seconds(points: &[Waypoint], index: usize, speed_mps: f64) -> f64 {
    seconds_for(remaining_distance(points, index), speed_mps)
}

fn seconds_for(distance: f64, speed_mps: f64) -> f64 {
    if speed_mps <= 0.0 || distance <= 0.0 || !distance.is_finite() {
        return 0.0;
    }
    distance / speed_mps
}

/// Renders a duration as `{d}天{h}小时{m}分钟{s}秒`, omitting zero components.
///
/// ```
/// use delivery_tracker::eta::format_eta;
/// assert_eq!(format_eta(3661.0), "1小时1分钟1秒");
/// assert_eq!(format_eta(0.0), "0秒");
/// ```
pub fn format_eta(seconds: f64) -> String {
    if seconds.is_nan() || seconds < 1.0 {
        return "0秒".to_string();
    }
    let total = seconds.floor() as u64;
    let parts = [
        (total / SECS_PER_DAY, "天"),
        (total % SECS_PER_DAY / SECS_PER_HOUR, "小时"),
        (total % SECS_PER_HOUR / SECS_PER_MINUTE, "分钟"),
        (total % SECS_PER_MINUTE, "秒"),
    ];
    parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect()
}

/// Renders the time left until `target` as space-separated days/hours/minutes.
///
/// Returns [`ARRIVED`] when `target` is now or in the past. Seconds are
/// dropped; less than a minute left still reads `1分钟`.
pub fn format_remaining_eta(target: SystemTime, now: SystemTime) -> String {
    let remaining = match target.duration_since(now) {
        Ok(remaining) if !remaining.is_zero() => remaining,
        _ => return ARRIVED.to_string(),
    };
    let minutes_total = remaining.as_secs().div_ceil(SECS_PER_MINUTE).max(1);
    let days = minutes_total / (SECS_PER_DAY / SECS_PER_MINUTE);
    let hours = minutes_total % (SECS_PER_DAY / SECS_PER_MINUTE) / (SECS_PER_HOUR / SECS_PER_MINUTE);
    let minutes = minutes_total % (SECS_PER_HOUR / SECS_PER_MINUTE);

    [(days, "天"), (hours, "小时"), (minutes, "分钟")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mean elapsed delivery time over `(shipped_at, delivered_at)` samples.
///
/// Samples delivered before they shipped are ignored. `None` if nothing is left.
pub fn average_delivery_seconds(samples: &[(SystemTime, SystemTime)]) -> Option<f64> {
    let elapsed: Vec<f64> = samples
        .iter()
        .filter_map(|(shipped, delivered)| delivered.duration_since(*shipped).ok())
        .map(|elapsed| elapsed.as_secs_f64())
        .collect();
    if elapsed.is_empty() {
        return None;
    }
    Some(elapsed.iter().sum::<f64>() / elapsed.len() as f64)
}

/// ETA computed once at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryEstimate {
    pub dispatched_at: SystemTime,
    pub eta_seconds: f64,
}

impl DeliveryEstimate {
    pub fn new(points: &[Waypoint], speed_mps: f64, dispatched_at: SystemTime) -> Self {
        Self {
            dispatched_at,
            eta_seconds: eta_seconds(points, speed_mps),
        }
    }

    pub fn expected_arrival(&self) -> SystemTime {
        self.dispatched_at + Duration::from_secs_f64(self.eta_seconds)
    }

    pub fn is_overdue(&self, now: SystemTime) -> bool {
        now >= self.expected_arrival()
    }

    pub fn describe(&self, now: SystemTime) -> String {
        format_remaining_eta(self.expected_arrival(), now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(lng: f64, lat: f64) -> Waypoint {
        Waypoint::new(lng, lat)
    }

    #[test]
    fn test_haversine_identity_and_symmetry() {
        let a = wp(116.397, 39.908);
        let b = wp(121.473, 31.230);
        assert_eq!(haversine(&a, &a), 0.0);
        assert_eq!(haversine(&a, &b), haversine(&b, &a));
        // Beijing to Shanghai is roughly 1,067 km.
        let km = haversine(&a, &b) / 1000.0;
        assert!((1050.0..1080.0).contains(&km), "got {km} km");
    }

    #[test]
    fn test_one_degree_of_longitude_on_equator() {
        let d = haversine(&wp(0.0, 0.0), &wp(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_total_distance() {
        assert_eq!(total_distance(&[]), 0.0);
        assert_eq!(total_distance(&[wp(3.0, 4.0)]), 0.0);
        let route = [wp(0.0, 0.0), wp(0.0, 0.0), wp(1.0, 0.0)];
        assert_eq!(total_distance(&route), haversine(&route[1], &route[2]));
        assert_eq!(remaining_distance(&route, 2), 0.0);
        assert_eq!(remaining_distance(&route, 9), 0.0);
        assert_eq!(remaining_distance(&route, 1), total_distance(&route));
    }

    #[test]
    fn test_eta_seconds() {
        let route = [wp(0.0, 0.0), wp(1.0, 0.0)];
        assert_eq!(eta_seconds(&route, 0.0), 0.0);
        assert_eq!(eta_seconds(&route, -3.0), 0.0);
        assert_eq!(eta_seconds(&[wp(0.0, 0.0)], 10.0), 0.0);
        let eta = eta_seconds(&route, 10.0);
        assert!((eta - 11_119.5).abs() < 1.0, "got {eta}");
        assert_eq!(remaining_eta_seconds(&route, 1, 10.0), 0.0);
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(0.0), "0秒");
        assert_eq!(format_eta(-5.0), "0秒");
        assert_eq!(format_eta(f64::NAN), "0秒");
        assert_eq!(format_eta(3661.0), "1小时1分钟1秒");
        assert_eq!(format_eta(59.9), "59秒");
        assert_eq!(format_eta(86_400.0), "1天");
        assert_eq!(format_eta(90_061.0), "1天1小时1分钟1秒");
        assert_eq!(format_eta(86_460.0), "1天1分钟");
    }

    #[test]
    fn test_format_remaining_eta() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(format_remaining_eta(now, now), ARRIVED);
        assert_eq!(format_remaining_eta(now - Duration::from_secs(5), now), ARRIVED);

        let in_90s = format_remaining_eta(now + Duration::from_millis(90_000), now);
        assert!(in_90s.contains("分钟"), "got {in_90s}");
        assert!(!in_90s.contains('-'));

        assert_eq!(format_remaining_eta(now + Duration::from_secs(20), now), "1分钟");
        assert_eq!(
            format_remaining_eta(now + Duration::from_secs(2 * 86_400 + 3 * 3600), now),
            "2天 3小时"
        );
        assert_eq!(
            format_remaining_eta(now + Duration::from_secs(3600 + 5 * 60), now),
            "1小时 5分钟"
        );
    }

    #[test]
    fn test_average_delivery_seconds() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        assert_eq!(average_delivery_seconds(&[]), None);
        let samples = [
            (t0, t0 + Duration::from_secs(100)),
            (t0, t0 + Duration::from_secs(300)),
            (t0 + Duration::from_secs(50), t0),
        ];
        assert_eq!(average_delivery_seconds(&samples), Some(200.0));
        assert_eq!(average_delivery_seconds(&samples[2..]), None);
    }

    #[test]
    fn test_delivery_estimate() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(10_000);
        let route = [wp(0.0, 0.0), wp(1.0, 0.0)];
        let estimate = DeliveryEstimate::new(&route, 10.0, t0);
        assert!(!estimate.is_overdue(t0));
        assert!(estimate.is_overdue(t0 + Duration::from_secs(12_000)));
        assert_eq!(estimate.describe(t0 + Duration::from_secs(12_000)), ARRIVED);
        assert_eq!(estimate.describe(t0), "3小时 6分钟");
    }
}
