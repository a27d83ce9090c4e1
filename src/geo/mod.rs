use crate::models::fix::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Great-circle distance between two fixes on a sphere of `radius_km`.
pub fn haversine_km(a: &Coordinates, b: &Coordinates, radius_km: f64) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    // rounding can push this a hair outside [0, 1] near antipodes
    let haversine =
        (sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng).clamp(0.0, 1.0);
    let central_angle = 2.0 * haversine.sqrt().atan2((1.0 - haversine).sqrt());

    radius_km * central_angle
}
