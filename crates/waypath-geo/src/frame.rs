//! Local planar coordinate frame anchored at a GPS origin.

use crate::projection::{lat_to_tile_y, lon_to_tile_x, tile_x_to_lon, tile_y_to_lat};
use crate::tiles::TileKey;
use waypath_core::config::{FrameConfig, MAX_ZOOM};
use waypath_core::{GeoError, GeoPoint, PlanarPoint};

/// Converts between GPS coordinates and planar offsets from a fixed origin.
///
/// One planar unit is `1 / unit_scale` of a tile at the frame's zoom. Planar `x` grows
/// east and `y` grows north; the tile-Y axis (which grows south) is flipped here.
///
/// The origin's tile coordinates are computed once, so a frame is immutable: moving the
/// origin means building a new frame and re-projecting everything that was planar.
/// Frames are `Copy` and safe to share between threads.
///
/// # Examples
///
/// ```
/// use waypath_core::GeoPoint;
/// use waypath_geo::LocalFrame;
///
/// let origin = GeoPoint::new(38.4063, -110.7918).unwrap();
/// let frame = LocalFrame::new(origin, 18, 10.0).unwrap();
///
/// let planar = frame.to_planar(origin);
/// assert_eq!((planar.x, planar.y), (0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    origin: GeoPoint,
    zoom: u8,
    unit_scale: f64,
    origin_tile_x: f64,
    origin_tile_y: f64,
}

impl LocalFrame {
    /// Builds a frame around `origin`.
    ///
    /// # Errors
    ///
    /// Fails when the origin is outside the Mercator domain, the zoom exceeds
    /// [`MAX_ZOOM`], or `unit_scale` is not a positive finite number.
    pub fn new(origin: GeoPoint, zoom: u8, unit_scale: f64) -> Result<Self, GeoError> {
        origin.validate()?;

        if zoom > MAX_ZOOM {
            return Err(GeoError::InvalidZoom { zoom });
        }

        if !unit_scale.is_finite() || unit_scale <= 0.0 {
            return Err(GeoError::InvalidUnitScale { value: unit_scale });
        }

        Ok(Self {
            origin,
            zoom,
            unit_scale,
            origin_tile_x: lon_to_tile_x(origin.longitude, zoom),
            origin_tile_y: lat_to_tile_y(origin.latitude, zoom),
        })
    }

    /// Builds a frame from the `frame` section of the configuration.
    pub fn from_config(config: &FrameConfig) -> waypath_core::Result<Self> {
        Ok(Self::new(config.origin()?, config.zoom, config.unit_scale)?)
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    /// Global fractional tile coordinates of the origin.
    pub fn origin_tile(&self) -> (f64, f64) {
        (self.origin_tile_x, self.origin_tile_y)
    }

    /// Projects a GPS point into the frame.
    pub fn to_planar(&self, point: GeoPoint) -> PlanarPoint {
        let tx = lon_to_tile_x(point.longitude, self.zoom);
        let ty = lat_to_tile_y(point.latitude, self.zoom);
        self.tile_to_planar(tx, ty)
    }

    /// Inverse of [`to_planar`](Self::to_planar).
    ///
    /// The result is not validated; planar points far outside the mapped area can
    /// produce longitudes beyond ±180.
    pub fn to_geo(&self, point: PlanarPoint) -> GeoPoint {
        let tx = point.x / self.unit_scale + self.origin_tile_x;
        let ty = -point.y / self.unit_scale + self.origin_tile_y;
        GeoPoint {
            latitude: tile_y_to_lat(ty, self.zoom),
            longitude: tile_x_to_lon(tx, self.zoom),
        }
    }

    /// Planar position of fractional global tile coordinates at the frame's zoom.
    pub fn tile_to_planar(&self, tx: f64, ty: f64) -> PlanarPoint {
        PlanarPoint::new(
            (tx - self.origin_tile_x) * self.unit_scale,
            (ty - self.origin_tile_y) * -self.unit_scale,
        )
    }

    /// Planar position of a tile's north-west corner, where a renderer anchors it.
    ///
    /// Tiles from another zoom level are rescaled into this frame's tile grid.
    pub fn tile_corner(&self, key: TileKey) -> PlanarPoint {
        let factor = 2_f64.powi(self.zoom as i32 - key.zoom as i32);
        self.tile_to_planar(key.x as f64 * factor, key.y as f64 * factor)
    }

    /// Planar edge length of one tile at the frame's zoom.
    pub fn tile_size(&self) -> f64 {
        self.unit_scale
    }
}
