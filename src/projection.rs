//! Web Mercator projection between geographic coordinates and slippy map tile space.
//!
//! Further reading: https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Error;

/// Largest latitude for which the Web Mercator projection stays finite.
pub const MAX_LAT: f64 = 85.051_128_779_806_6;
pub const MIN_LAT: f64 = -MAX_LAT;

pub const MAX_LON: f64 = 180.0;
pub const MIN_LON: f64 = -180.0;

/// Deepest zoom level whose grid size (and exclusive far edge) fits in a `u32`.
pub const MAX_ZOOM: u8 = 31;

/// Half the circumference of the earth in EPSG:3857 metres.
pub const EPSG_3857_EXTENT: f64 = 20_037_508.342_789_244;

/// A geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> GeoPoint {
        GeoPoint { lon, lat }
    }
}

/// Column/row address of a tile within one zoom level's grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    pub x: u32,
    pub y: u32,
}

impl TileIndex {
    pub fn new(x: u32, y: u32) -> TileIndex {
        TileIndex { x, y }
    }

    pub fn at_zoom(self, zoom: u8) -> TileAddress {
        TileAddress {
            x: self.x,
            y: self.y,
            zoom,
        }
    }
}

/// A globally unique tile in XYZ format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileAddress {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

/// Geographic bounds of an area, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoBBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Bounds in EPSG:3857 (web mercator) metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MercatorBBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Number of tiles along each axis of the grid at `zoom`.
///
/// `zoom` must be at most [`MAX_ZOOM`].
#[inline]
pub fn grid_size(zoom: u8) -> u64 {
    1u64 << zoom
}

/// Rejects zoom levels whose grid doesn't fit in `u32` tile indices.
pub fn check_zoom(zoom: u8) -> Result<(), Error> {
    if zoom > MAX_ZOOM {
        return Err(Error::InvalidArgument(format!(
            "zoom ({}) must be at most {}",
            zoom, MAX_ZOOM
        )));
    }

    Ok(())
}

/// Projects a point to fractional tile coordinates at `zoom`.
///
/// Out of range latitudes are clamped to the Mercator-valid band rather than rejected,
/// so the result is always finite for finite input. `zoom` must be at most [`MAX_ZOOM`].
pub fn project(point: GeoPoint, zoom: u8) -> (f64, f64) {
    let lat = point.lat.clamp(MIN_LAT, MAX_LAT);
    if lat != point.lat {
        trace!(lat = point.lat, clamped = lat, "latitude outside mercator range");
    }
    let lon = point.lon.clamp(MIN_LON, MAX_LON);

    let n = grid_size(zoom) as f64;
    let lat_rad = lat.to_radians();

    let fx = (lon + 180.0) / 360.0 * n;
    // ln(tan + sec) is asinh(tan), which is better behaved near the poles
    let fy = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;

    (fx, fy)
}

/// Projects a point and floors it to the tile containing it, clamped to the grid.
///
/// `zoom` must be at most [`MAX_ZOOM`]; see [`check_zoom`].
pub fn tile_index(point: GeoPoint, zoom: u8) -> TileIndex {
    let (fx, fy) = project(point, zoom);
    let max = (grid_size(zoom) - 1) as f64;

    // Casting a NaN to an integer yields 0, so degenerate input lands on the first tile
    TileIndex {
        x: fx.floor().clamp(0.0, max) as u32,
        y: fy.floor().clamp(0.0, max) as u32,
    }
}

/// Geographic coordinate of the north-west corner of tile (x, y).
///
/// `x` and `y` may equal the grid size, which names the far (south-east) edge of the grid.
pub fn tile_to_geo(x: u32, y: u32, zoom: u8) -> GeoPoint {
    let (lon, lat) = slippy_map_tilenames::tile2lonlat(x, y, zoom);
    GeoPoint { lon, lat }
}

/// Geographic bounds of a single tile.
pub fn tile_bounds(address: TileAddress) -> GeoBBox {
    let nw = tile_to_geo(address.x, address.y, address.zoom);
    let se = tile_to_geo(address.x + 1, address.y + 1, address.zoom);

    GeoBBox {
        west: nw.lon,
        south: se.lat,
        east: se.lon,
        north: nw.lat,
    }
}

/// Converts a geographic coordinate to EPSG:3857 metres.
pub fn lonlat_to_mercator(point: GeoPoint) -> (f64, f64) {
    let lat = point.lat.clamp(MIN_LAT, MAX_LAT);
    let lon = point.lon.clamp(MIN_LON, MAX_LON);
    let x = lon / 180.0 * EPSG_3857_EXTENT;
    let y = (lat.to_radians().tan().asinh()) / PI * EPSG_3857_EXTENT;
    (x, y)
}

/// Web mercator bounds of a tile, grown on every side by `buffer_px` pixels
/// of a `tile_size` pixel tile.
pub fn epsg_3857_tile_bounds(
    address: TileAddress,
    tile_size: u32,
    buffer_px: u32,
) -> Result<MercatorBBox, Error> {
    check_zoom(address.zoom)?;
    if tile_size == 0 {
        return Err(Error::InvalidArgument(
            "tile_size must be positive".to_string(),
        ));
    }

    let tile_span = 2.0 * EPSG_3857_EXTENT / grid_size(address.zoom) as f64;
    let buffer = tile_span * f64::from(buffer_px) / f64::from(tile_size);

    let west = f64::from(address.x) * tile_span - EPSG_3857_EXTENT;
    let north = EPSG_3857_EXTENT - f64::from(address.y) * tile_span;

    Ok(MercatorBBox {
        west: west - buffer,
        south: north - tile_span - buffer,
        east: west + tile_span + buffer,
        north: north + buffer,
    })
}
