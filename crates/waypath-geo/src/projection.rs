//! Web-Mercator tile math.
//!
//! Pure functions between degrees and fractional tile indices at a zoom level
//! (slippy-map addressing, tile-Y grows southward). Latitudes outside the Mercator
//! domain produce non-finite values instead of errors; validate with
//! [`GeoPoint::validate`](waypath_core::GeoPoint::validate) before projecting.

use std::f64::consts::PI;

/// Number of tiles along one axis at `zoom`.
#[inline]
pub fn tile_count(zoom: u8) -> f64 {
    2_f64.powi(zoom as i32)
}

/// Longitude in degrees to fractional tile-X.
pub fn lon_to_tile_x(lon: f64, zoom: u8) -> f64 {
    (lon + 180.0) / 360.0 * tile_count(zoom)
}

/// Latitude in degrees to fractional tile-Y.
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> f64 {
    let lat_rad = lat.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    y * tile_count(zoom)
}

/// Fractional tile-X to longitude in degrees.
pub fn tile_x_to_lon(tx: f64, zoom: u8) -> f64 {
    tx / tile_count(zoom) * 360.0 - 180.0
}

/// Fractional tile-Y to latitude in degrees (inverse Gudermannian).
pub fn tile_y_to_lat(ty: f64, zoom: u8) -> f64 {
    (PI - 2.0 * PI * ty / tile_count(zoom)).sinh().atan().to_degrees()
}
