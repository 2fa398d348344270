//! Great-circle distance (Haversine)

use crate::utils::constants::EARTH_RADIUS_KM;

/// Distance in kilometers between two `(lat, lon)` pairs given in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Whole kilometers, rounded down
pub fn estimated_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> u64 {
    let km = haversine_km(lat1, lon1, lat2, lon2);
    // NaN (bad coordinates) saturates to 0
    km.floor() as u64
}
