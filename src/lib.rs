//! # Tile Planner
//!
//! Tools for planning the tile work a set of geographic points implies.
//!
//! ## Current features
//!
//! Given a set of points and a range of zoom levels, this crate computes the slippy map
//! tile range covering the points at each zoom, and splits each range into jobs whose
//! tile count never exceeds a configured limit. Jobs expand into their tiles on demand,
//! so a worker pool can pick them up and render or check them independently.
//!
//! ```
//! use tile_planner::{plan, GeoPoint, PlanConfig};
//!
//! let points = [GeoPoint::new(-179.0, -85.0), GeoPoint::new(179.0, 85.0)];
//! let jobs = plan(&points, &PlanConfig::new(2, 2, 256, 4)).unwrap();
//!
//! assert_eq!(4, jobs.len());
//! assert!(jobs.iter().all(|job| job.tiles().len() == 4));
//! ```
//!
//! ## Known Limitations
//!
//! Rendering is left to an external cartographic engine. This crate only defines the
//! [`TileRenderer`] boundary and the bookkeeping around it. Points are assumed to be in
//! EPSG:4326 longitude/latitude, and tiles are addressed in the XYZ scheme.
//!
//! Planning is pure and synchronous; any number of plans may run in parallel on
//! separate threads.

#![deny(warnings)]

// TODO: remove once async fn in traits can be used through trait objects
use async_trait::async_trait;

/// The seam to an external renderer. Implementations turn one tile into encoded image bytes.
///
/// Failures are returned per tile. The caller decides whether to retry, skip, or abort.
#[async_trait]
pub trait TileRenderer: Send + Sync {
    /// Renders the tile described by `request` at its pixel dimensions.
    async fn render_tile(&self, request: &render::TileRequest) -> Result<render::RenderedImage, Error>;
}

pub mod bounds;
pub mod error;
pub mod job;
pub mod partition;
pub mod planner;
pub mod projection;
pub mod render;

pub use bounds::{aggregate, TileRect};
pub use error::Error;
pub use job::{enumerate, Job};
pub use partition::partition;
pub use planner::{plan, plan_zoom, plan_zoom_range, PlanConfig};
pub use projection::{project, tile_bounds, tile_index, tile_to_geo, GeoPoint, TileAddress, TileIndex};
pub use render::{render_job, RenderedImage, RendererConfig, TileRequest};
