/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two `(lat, lon)` points in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// `bbox` is `[min_lat, min_lon, max_lat, max_lon]`, edges inclusive.
pub fn in_bounding_box(lat: f64, lon: f64, bbox: &[f64; 4]) -> bool {
    let [min_lat, min_lon, max_lat, max_lon] = *bbox;
    lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
}
