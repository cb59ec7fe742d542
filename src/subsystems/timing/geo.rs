//! Geodetic helpers

use crate::devices::gnss::Position;

/// Mean earth radius used by the great-circle distance
pub const EARTH_RADIUS_M: f64 = 6_372_795.0;

/// Great-circle distance between two positions in meters (haversine)
pub fn distance_m(a: Position, b: Position) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let sin_dlat = libm::sin(dlat / 2.0);
    let sin_dlon = libm::sin(dlon / 2.0);
    let h = sin_dlat * sin_dlat + libm::cos(lat1) * libm::cos(lat2) * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * libm::asin(libm::sqrt(h))
}
