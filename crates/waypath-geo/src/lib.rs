//! # waypath-geo
//!
//! Geometry between GPS coordinates and the flat frame missions are edited in.
//!
//! - [`projection`]: Web-Mercator tile math (degrees to fractional tile indices and back)
//! - [`frame`]: [`LocalFrame`], planar offsets from a configurable origin
//! - [`tiles`]: tile addressing, tile coverage around the origin and the tile delivery contract
//!
//! ## Example
//!
//! ```
//! use waypath_core::{GeoPoint, PlanarPoint};
//! use waypath_geo::LocalFrame;
//!
//! let frame = LocalFrame::new(GeoPoint::new(51.5, -0.12).unwrap(), 16, 1.0).unwrap();
//! let probe = PlanarPoint::new(0.25, -0.5);
//! let back = frame.to_planar(frame.to_geo(probe));
//! assert!(back.distance(probe) < 1e-9);
//! ```

pub mod frame;
pub mod projection;
pub mod tiles;

pub use frame::LocalFrame;
pub use tiles::{
    tiles_around, DirectoryTileSource, TileDispatch, TileImage, TileKey, TileLayer, TileSource,
};
