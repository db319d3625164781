//! The boundary between planned tiles and an external cartographic renderer.
//!
//! The rendering engine itself lives outside this crate. This module carries what every
//! engine needs around it: a process-wide registry of plugin and font locations set up
//! exactly once, per-tile requests with their projected bounds, and bounded-concurrency
//! dispatch of a job's tiles.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Error;
use crate::job::Job;
use crate::projection::{epsg_3857_tile_bounds, MercatorBBox, TileAddress};
use crate::TileRenderer;

/// Buffer applied around each tile when the style doesn't set one.
pub const DEFAULT_BUFFER_SIZE: u32 = 96;

static REGISTRY: OnceCell<RendererRegistry> = OnceCell::new();

/// Locations of renderer data source plugins and fonts, shared by the whole process.
#[derive(Debug, PartialEq, Eq)]
pub struct RendererRegistry {
    pub plugins_path: PathBuf,
    pub fonts_path: PathBuf,
}

/// Registers plugin and font locations for the process.
///
/// Only the first call has any effect; every call returns the registry that was set up first.
pub fn init_renderer_registry(plugins_path: &Path, fonts_path: &Path) -> &'static RendererRegistry {
    REGISTRY.get_or_init(|| {
        debug!(?plugins_path, ?fonts_path, "initializing renderer registry");
        RendererRegistry {
            plugins_path: plugins_path.to_path_buf(),
            fonts_path: fonts_path.to_path_buf(),
        }
    })
}

/// The registry, if [`init_renderer_registry`] has run.
pub fn renderer_registry() -> Option<&'static RendererRegistry> {
    REGISTRY.get()
}

/// Settings for constructing a renderer.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct RendererConfig {
    pub style_path: PathBuf,
    pub plugins_path: PathBuf,
    pub fonts_path: PathBuf,
    #[serde(rename = "buffer-size", default)]
    pub buffer_size: u32,
}

impl RendererConfig {
    /// Constructs a new RendererConfig using a YAML string
    pub fn from_yaml(data: &str) -> Result<RendererConfig, Error> {
        Ok(serde_yaml::from_str(data)?)
    }

    /// The configured buffer, in pixels; zero selects [`DEFAULT_BUFFER_SIZE`].
    pub fn effective_buffer_size(&self) -> u32 {
        if self.buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            self.buffer_size
        }
    }

    /// Checks that the style exists and sets up the process-wide registry.
    pub fn init(&self) -> Result<&'static RendererRegistry, Error> {
        if !self.style_path.is_file() {
            return Err(Error::RendererInit(format!(
                "style {} is not a readable file",
                self.style_path.display()
            )));
        }

        Ok(init_renderer_registry(&self.plugins_path, &self.fonts_path))
    }
}

/// A single tile to render at the given pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRequest {
    pub address: TileAddress,
    pub width: u32,
    pub height: u32,
    /// Pixels of surrounding map rendered around the tile, so labels and symbols
    /// crossing the tile edge line up with the neighbours.
    pub buffer_size: u32,
}

impl TileRequest {
    pub fn new(address: TileAddress, width: u32, height: u32) -> TileRequest {
        TileRequest {
            address,
            width,
            height,
            buffer_size: 0,
        }
    }

    pub fn with_buffer(self, buffer_size: u32) -> TileRequest {
        TileRequest {
            buffer_size,
            ..self
        }
    }

    /// The web mercator box a renderer zooms to for this tile, buffer included.
    ///
    /// Fails for a zero width or a zoom past [`MAX_ZOOM`](crate::projection::MAX_ZOOM).
    pub fn bounds(&self) -> Result<MercatorBBox, Error> {
        epsg_3857_tile_bounds(self.address, self.width, self.buffer_size)
    }
}

/// An encoded raster tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RenderedImage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Renders every tile of `job` at the job's tile size with a `buffer_size` pixel buffer,
/// keeping at most `concurrency` tiles in flight.
///
/// Each tile gets its own result; failures are logged and returned, never retried.
/// Results arrive in completion order. Pass [`RendererConfig::effective_buffer_size`]
/// to honour a renderer's configuration.
pub async fn render_job<R>(
    renderer: &R,
    job: &Job,
    buffer_size: u32,
    concurrency: usize,
) -> Vec<(TileAddress, Result<RenderedImage, Error>)>
where
    R: TileRenderer + ?Sized,
{
    let tile_size = job.tile_size;

    stream::iter(job.addresses())
        .map(|address| async move {
            let request = TileRequest::new(address, tile_size, tile_size).with_buffer(buffer_size);
            let result = renderer.render_tile(&request).await;
            if let Err(e) = &result {
                warn!(zoom = address.zoom, x = address.x, y = address.y, "{}", e);
            }
            (address, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}
