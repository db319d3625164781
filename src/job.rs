//! Planned units of tile work and their lazy tile enumeration.

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::bounds::TileRect;
use crate::projection::{tile_to_geo, GeoPoint, TileAddress, TileIndex};

/// A bounded rectangle of tiles at one zoom level, sized for a single worker.
///
/// The tile list is materialized on first request and kept for the life of the job.
#[derive(Debug, Serialize)]
pub struct Job {
    pub zoom: u8,
    pub tile_size: u32,
    /// North-west corner of the job's extent. Informational only.
    pub top_left: GeoPoint,
    /// South-east corner of the job's extent. Informational only.
    pub bot_right: GeoPoint,
    pub rect: TileRect,
    #[serde(skip)]
    tiles: OnceCell<Vec<TileIndex>>,
}

impl Job {
    pub fn new(zoom: u8, tile_size: u32, rect: TileRect) -> Job {
        Job {
            zoom,
            tile_size,
            top_left: tile_to_geo(rect.x_start, rect.y_start, zoom),
            bot_right: tile_to_geo(rect.x_end, rect.y_end, zoom),
            rect,
            tiles: OnceCell::new(),
        }
    }

    pub fn x_start(&self) -> u32 {
        self.rect.x_start
    }

    pub fn y_start(&self) -> u32 {
        self.rect.y_start
    }

    pub fn x_end(&self) -> u32 {
        self.rect.x_end
    }

    pub fn y_end(&self) -> u32 {
        self.rect.y_end
    }

    /// Number of tiles covered, without materializing them.
    pub fn tile_count(&self) -> u64 {
        self.rect.tile_count()
    }

    /// The tiles of this job in row-major order, enumerated at most once.
    pub fn tiles(&self) -> &[TileIndex] {
        self.tiles.get_or_init(|| enumerate(&self.rect))
    }

    /// Length of the materialized tile list, or zero if it hasn't been enumerated yet.
    pub fn num_tiles(&self) -> usize {
        self.tiles.get().map_or(0, Vec::len)
    }

    pub fn is_materialized(&self) -> bool {
        self.tiles.get().is_some()
    }

    /// Global addresses of every tile in this job.
    pub fn addresses(&self) -> impl Iterator<Item = TileAddress> + '_ {
        let zoom = self.zoom;
        self.tiles().iter().map(move |tile| tile.at_zoom(zoom))
    }
}

/// Lists every tile of `rect`, row by row.
pub fn enumerate(rect: &TileRect) -> Vec<TileIndex> {
    let mut tiles = Vec::with_capacity(rect.tile_count() as usize);
    for y in rect.y_start..rect.y_end {
        tiles.extend((rect.x_start..rect.x_end).map(|x| TileIndex::new(x, y)));
    }

    tiles
}
