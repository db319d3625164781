//! Aggregation of scattered points into the tile range covering them.

use serde::Serialize;

use crate::error::Error;
use crate::projection::{check_zoom, grid_size, tile_index, GeoPoint, TileIndex};

/// A rectangle of tile indices, inclusive at the start and exclusive at the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TileRect {
    pub x_start: u32,
    pub y_start: u32,
    pub x_end: u32,
    pub y_end: u32,
}

impl TileRect {
    /// The rectangle covering no tiles.
    pub const EMPTY: TileRect = TileRect {
        x_start: 0,
        y_start: 0,
        x_end: 0,
        y_end: 0,
    };

    pub fn new(x_start: u32, y_start: u32, x_end: u32, y_end: u32) -> TileRect {
        TileRect {
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    pub fn width(&self) -> u32 {
        self.x_end.saturating_sub(self.x_start)
    }

    pub fn height(&self) -> u32 {
        self.y_end.saturating_sub(self.y_start)
    }

    pub fn tile_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.tile_count() == 0
    }

    pub fn contains(&self, tile: TileIndex) -> bool {
        (self.x_start..self.x_end).contains(&tile.x) && (self.y_start..self.y_end).contains(&tile.y)
    }
}

/// Computes the smallest tile rectangle at `zoom` containing every point.
///
/// Returns [`TileRect::EMPTY`] when there are no points, and an error when `zoom`
/// is deeper than [`MAX_ZOOM`](crate::projection::MAX_ZOOM).
pub fn aggregate(points: &[GeoPoint], zoom: u8) -> Result<TileRect, Error> {
    check_zoom(zoom)?;
    let limit = u32::try_from(grid_size(zoom))
        .map_err(|_| Error::InvalidArgument(format!("grid at zoom {} exceeds u32", zoom)))?;

    let mut indices = points.iter().map(|point| tile_index(*point, zoom));
    let first = match indices.next() {
        Some(first) => first,
        None => return Ok(TileRect::EMPTY),
    };

    let (min, max) = indices.fold((first, first), |(min, max), tile| {
        (
            TileIndex::new(min.x.min(tile.x), min.y.min(tile.y)),
            TileIndex::new(max.x.max(tile.x), max.y.max(tile.y)),
        )
    });

    // tile_index already clamps to the grid, so this only guards the exclusive edge
    Ok(TileRect {
        x_start: min.x,
        y_start: min.y,
        x_end: (max.x + 1).min(limit),
        y_end: (max.y + 1).min(limit),
    })
}
