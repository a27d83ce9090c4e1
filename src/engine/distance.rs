use serde::Serialize;

use crate::geo::{haversine_km, EARTH_RADIUS_KM};
use crate::models::fix::GpsFix;

const DEFAULT_MAX_SPEED_KMH: f64 = 150.0;
const DEFAULT_JUMP_THRESHOLD_KM: f64 = 10.0;

/// Tunables for trajectory verification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceConfig {
    pub earth_radius_km: f64,
    /// Fastest plausible travel speed between two fixes.
    pub max_speed_kmh: f64,
    /// Segments at or above this length are GPS jumps regardless of elapsed time.
    pub jump_threshold_km: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            earth_radius_km: EARTH_RADIUS_KM,
            max_speed_kmh: DEFAULT_MAX_SPEED_KMH,
            jump_threshold_km: DEFAULT_JUMP_THRESHOLD_KM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceEstimate {
    pub verified_km: f64,
    pub insufficient: bool,
    pub segments_accepted: usize,
    pub segments_discarded: usize,
}

impl DistanceEstimate {
    fn insufficient() -> Self {
        Self {
            verified_km: 0.0,
            insufficient: true,
            segments_accepted: 0,
            segments_discarded: 0,
        }
    }
}

/// Sums the plausible segments between consecutive fixes.
///
/// Fixes are expected in ascending timestamp order and are never re-sorted.
/// Every raw neighbour pair is judged on its own, so one corrupted fix drops
/// both the segment into it and the segment out of it.
pub fn estimate_distance(fixes: &[GpsFix], config: &DistanceConfig) -> DistanceEstimate {
    if fixes.len() < 2 {
        return DistanceEstimate::insufficient();
    }

    let mut total_km = 0.0;
    let mut segments_accepted = 0;
    let mut segments_discarded = 0;

    for pair in fixes.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        let distance_km =
            haversine_km(&prev.coordinates, &curr.coordinates, config.earth_radius_km);
        let elapsed_secs = elapsed_seconds(prev, curr);

        if segment_is_plausible(distance_km, elapsed_secs, config) {
            total_km += distance_km;
            segments_accepted += 1;
        } else {
            segments_discarded += 1;
            tracing::debug!(
                distance_km,
                elapsed_secs,
                from = %prev.timestamp,
                to = %curr.timestamp,
                "discarding implausible gps segment"
            );
        }
    }

    DistanceEstimate {
        verified_km: round_to_hundredths(total_km),
        insufficient: false,
        segments_accepted,
        segments_discarded,
    }
}

/// Speed bound is inclusive, jump threshold is exclusive. A zero or negative
/// `elapsed_secs` yields a bound that no positive distance can meet.
pub fn segment_is_plausible(distance_km: f64, elapsed_secs: f64, config: &DistanceConfig) -> bool {
    let max_distance_km = (config.max_speed_kmh / 3600.0) * elapsed_secs;
    distance_km <= max_distance_km && distance_km < config.jump_threshold_km
}

fn elapsed_seconds(prev: &GpsFix, curr: &GpsFix) -> f64 {
    (curr.timestamp - prev.timestamp).num_milliseconds() as f64 / 1000.0
}

fn round_to_hundredths(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
