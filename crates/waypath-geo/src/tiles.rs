//! Tile addressing and the tile delivery contract.
//!
//! Fetching tiles is someone else's job. A [`TileSource`] is handed an explicit
//! [`TileDispatch`] handle with every request and delivers through it at most once per
//! request, from any thread, or never on failure. The owning [`TileLayer`] drains those
//! deliveries on its own thread with [`TileLayer::pump`].

use crate::frame::LocalFrame;
use crate::projection::tile_count;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Slippy-map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileKey {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Raster payload for one tile, as produced by the tile source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImage {
    pub data: Bytes,
}

impl TileImage {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A tile delivered by a source.
#[derive(Debug, Clone)]
pub struct TileDelivery {
    pub key: TileKey,
    pub image: TileImage,
}

/// Cloneable handle a tile source uses to hand tiles back to their owner.
#[derive(Debug, Clone)]
pub struct TileDispatch {
    tx: flume::Sender<TileDelivery>,
}

impl TileDispatch {
    /// Delivers a loaded tile. Deliveries after the owning layer is gone are dropped.
    pub fn deliver(&self, key: TileKey, image: TileImage) {
        if self.tx.send(TileDelivery { key, image }).is_err() {
            debug!(tile = %key, "Tile layer dropped, discarding delivery");
        }
    }
}

/// Collaborator that acquires tile images.
///
/// Implementations may deliver synchronously inside `load_tile` or later from another
/// thread. Failures are logged by the source and result in no delivery.
pub trait TileSource: Send + Sync {
    fn load_tile(&self, key: TileKey, dispatch: TileDispatch);
}

/// Tile source backed by a directory laid out as `{root}/{z}/{x}/{y}.png`.
#[derive(Debug, Clone)]
pub struct DirectoryTileSource {
    root: PathBuf,
}

impl DirectoryTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path for a tile.
    pub fn tile_path(&self, key: TileKey) -> PathBuf {
        self.root
            .join(key.zoom.to_string())
            .join(key.x.to_string())
            .join(format!("{}.png", key.y))
    }
}

impl TileSource for DirectoryTileSource {
    fn load_tile(&self, key: TileKey, dispatch: TileDispatch) {
        let path = self.tile_path(key);
        match std::fs::read(&path) {
            Ok(data) => dispatch.deliver(key, TileImage::new(data)),
            Err(e) => warn!(tile = %key, path = %path.display(), error = %e, "Tile not available"),
        }
    }
}

/// Tiles received so far, keyed by address.
///
/// Sources are trusted to deliver each key at most once; a repeated delivery simply
/// replaces the stored image.
#[derive(Debug)]
pub struct TileLayer {
    tx: flume::Sender<TileDelivery>,
    rx: flume::Receiver<TileDelivery>,
    requested: HashSet<TileKey>,
    loaded: HashMap<TileKey, TileImage>,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl TileLayer {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            tx,
            rx,
            requested: HashSet::new(),
            loaded: HashMap::new(),
        }
    }

    /// Handle to pass to tile sources.
    pub fn dispatch(&self) -> TileDispatch {
        TileDispatch {
            tx: self.tx.clone(),
        }
    }

    /// Asks `source` for every key not already requested.
    pub fn request<I>(&mut self, source: &dyn TileSource, keys: I) -> usize
    where
        I: IntoIterator<Item = TileKey>,
    {
        let mut issued = 0;
        for key in keys {
            if self.requested.insert(key) {
                source.load_tile(key, self.dispatch());
                issued += 1;
            }
        }
        debug!(issued, "Requested tiles");
        issued
    }

    /// Stores a delivered tile.
    pub fn deliver_tile(&mut self, key: TileKey, image: TileImage) {
        debug!(tile = %key, bytes = image.len(), "Tile delivered");
        self.loaded.insert(key, image);
    }

    /// Drains pending deliveries into the layer, returning how many arrived.
    pub fn pump(&mut self) -> usize {
        let deliveries: Vec<TileDelivery> = self.rx.try_iter().collect();
        let count = deliveries.len();
        for delivery in deliveries {
            self.deliver_tile(delivery.key, delivery.image);
        }
        count
    }

    pub fn get(&self, key: &TileKey) -> Option<&TileImage> {
        self.loaded.get(key)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Requested keys that have not been delivered yet.
    pub fn pending(&self) -> Vec<TileKey> {
        self.requested
            .iter()
            .filter(|key| !self.loaded.contains_key(key))
            .copied()
            .collect()
    }
}

/// Tile keys in a `(2r+1)`-wide square centred on the frame origin's tile.
///
/// Keys outside the world's tile range are skipped. Ordered row by row, north to south.
pub fn tiles_around(frame: &LocalFrame, radius: u32) -> Vec<TileKey> {
    let zoom = frame.zoom();
    let max_index = tile_count(zoom) as i64 - 1;
    let (ox, oy) = frame.origin_tile();
    let (cx, cy) = (ox.floor() as i64, oy.floor() as i64);
    let r = radius as i64;
    let (x0, x1) = ((cx - r).max(0), (cx + r).min(max_index));
    let (y0, y1) = ((cy - r).max(0), (cy + r).min(max_index));

    let mut keys = Vec::new();
    for y in y0..=y1 {
        for x in x0..=x1 {
            keys.push(TileKey::new(x as u32, y as u32, zoom));
        }
    }
    keys
}
