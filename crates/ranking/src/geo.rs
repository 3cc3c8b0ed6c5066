use wayfare_core::Coordinate;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Sentinel for coordinates no distance can be computed for. Callers must
/// exclude sentinel entries from results instead of failing the whole pass.
pub const UNREACHABLE_KM: f64 = f64::INFINITY;

/// Great-circle distance in kilometers via the haversine formula.
///
/// Identical coordinates return exactly 0. Malformed input (non-finite or
/// off-Earth values) returns `UNREACHABLE_KM` rather than an error, so one
/// bad catalog record cannot abort ranking of the rest. The asin argument is
/// clamped to keep antipodal points out of NaN territory.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    if !a.is_on_earth() || !b.is_on_earth() {
        return UNREACHABLE_KM;
    }
    if a.latitude == b.latitude && a.longitude == b.longitude {
        return 0.0;
    }

    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().clamp(0.0, 1.0).asin();

    let distance = EARTH_RADIUS_KM * c;
    if distance.is_finite() {
        distance
    } else {
        UNREACHABLE_KM
    }
}
