//! Planning of tile coverage jobs across a range of zoom levels.

use serde::Deserialize;
use tracing::debug;

use crate::bounds::aggregate;
use crate::error::Error;
use crate::job::Job;
use crate::partition::partition;
use crate::projection::{GeoPoint, MAX_ZOOM};

fn default_tile_size() -> u32 {
    256
}

/// Parameters for a planning run.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct PlanConfig {
    #[serde(rename = "minzoom")]
    pub min_zoom: u8,
    #[serde(rename = "maxzoom")]
    pub max_zoom: u8,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Ceiling on the number of tiles in any one job.
    pub job_check_limit: u64,
}

impl PlanConfig {
    pub fn new(min_zoom: u8, max_zoom: u8, tile_size: u32, job_check_limit: u64) -> PlanConfig {
        PlanConfig {
            min_zoom,
            max_zoom,
            tile_size,
            job_check_limit,
        }
    }

    /// Constructs a new PlanConfig from a YAML string and validates it.
    pub fn from_yaml(data: &str) -> Result<PlanConfig, Error> {
        let config: PlanConfig = serde_yaml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.job_check_limit < 1 {
            return Err(Error::InvalidConfig(
                "job_check_limit must be at least 1".to_string(),
            ));
        }
        if self.min_zoom > self.max_zoom {
            return Err(Error::InvalidConfig(format!(
                "minzoom ({}) must not exceed maxzoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.max_zoom > MAX_ZOOM {
            return Err(Error::InvalidConfig(format!(
                "maxzoom ({}) must be at most {}",
                self.max_zoom, MAX_ZOOM
            )));
        }
        if self.tile_size == 0 {
            return Err(Error::InvalidConfig(
                "tile_size must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Plans the jobs covering `points` at every zoom level of `config`, in increasing zoom order.
///
/// The configuration is validated before anything is computed. An empty point set
/// yields no jobs.
pub fn plan(points: &[GeoPoint], config: &PlanConfig) -> Result<Vec<Job>, Error> {
    config.validate()?;

    let mut jobs = Vec::new();
    for zoom in config.min_zoom..=config.max_zoom {
        jobs.extend(plan_zoom(points, zoom, config.tile_size, config.job_check_limit)?);
    }

    debug!(
        points = points.len(),
        min_zoom = config.min_zoom,
        max_zoom = config.max_zoom,
        jobs = jobs.len(),
        "planned tile coverage"
    );

    Ok(jobs)
}

/// Positional form of [`plan`].
pub fn plan_zoom_range(
    points: &[GeoPoint],
    min_zoom: u8,
    max_zoom: u8,
    tile_size: u32,
    job_check_limit: u64,
) -> Result<Vec<Job>, Error> {
    plan(
        points,
        &PlanConfig::new(min_zoom, max_zoom, tile_size, job_check_limit),
    )
}

/// Plans the batch of jobs for a single zoom level.
///
/// Fails on the same zoom, tile size and limit violations [`PlanConfig::validate`] rejects.
pub fn plan_zoom(
    points: &[GeoPoint],
    zoom: u8,
    tile_size: u32,
    job_check_limit: u64,
) -> Result<Vec<Job>, Error> {
    PlanConfig::new(zoom, zoom, tile_size, job_check_limit).validate()?;

    let bounds = aggregate(points, zoom)?;
    if bounds.is_empty() {
        return Ok(Vec::new());
    }

    let jobs: Vec<Job> = partition(bounds, job_check_limit)
        .into_iter()
        .map(|rect| Job::new(zoom, tile_size, rect))
        .collect();

    debug!(
        zoom,
        x_start = bounds.x_start,
        y_start = bounds.y_start,
        x_end = bounds.x_end,
        y_end = bounds.y_end,
        jobs = jobs.len(),
        "planned zoom level"
    );

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::bounds::TileRect;

    fn world() -> Vec<GeoPoint> {
        vec![GeoPoint::new(-179.0, -85.0), GeoPoint::new(179.0, 85.0)]
    }

    #[test]
    fn test_single_point_zoom_zero() {
        let jobs = plan_zoom_range(&[GeoPoint::new(0.0, 0.0)], 0, 0, 256, 10).unwrap();
        assert_eq!(1, jobs.len());
        assert_eq!(TileRect::new(0, 0, 1, 1), jobs[0].rect);
        assert_eq!(1, jobs[0].tile_count());
        assert_eq!(1, jobs[0].tiles().len());
    }

    #[test]
    fn test_whole_world_split() {
        let jobs = plan_zoom_range(&world(), 2, 2, 256, 4).unwrap();
        assert!(jobs.len() >= 4);
        assert!(jobs.iter().all(|job| job.tile_count() <= 4 && job.zoom == 2));

        let tiles: Vec<_> = jobs.iter().flat_map(|job| job.tiles().iter().copied()).collect();
        let unique: HashSet<_> = tiles.iter().copied().collect();
        assert_eq!(16, tiles.len());
        assert_eq!(16, unique.len());
    }

    #[test]
    fn test_empty_points() {
        let jobs = plan_zoom_range(&[], 0, 14, 256, 4).unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_generous_limit_gives_one_job_per_zoom() {
        let points = [GeoPoint::new(2.35, 48.85), GeoPoint::new(13.40, 52.52)];
        let jobs = plan_zoom_range(&points, 3, 9, 256, u64::MAX).unwrap();

        assert_eq!(7, jobs.len());
        for (job, zoom) in jobs.iter().zip(3..=9) {
            assert_eq!(zoom, job.zoom);
            assert_eq!(aggregate(&points, zoom).unwrap(), job.rect);
        }
    }

    #[test]
    fn test_zoom_order_and_tile_size() {
        let jobs = plan_zoom_range(&world(), 1, 3, 512, 4).unwrap();
        let zooms: Vec<u8> = jobs.iter().map(|job| job.zoom).collect();
        let mut sorted = zooms.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, zooms);
        assert_eq!(Some(&1), zooms.first());
        assert_eq!(Some(&3), zooms.last());
        assert!(jobs.iter().all(|job| job.tile_size == 512));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            plan_zoom_range(&world(), 0, 2, 256, 0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            plan_zoom_range(&world(), 5, 2, 256, 4),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            plan_zoom_range(&world(), 0, 32, 256, 4),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            plan_zoom_range(&world(), 0, 2, 0, 4),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parse_config() {
        let config = PlanConfig::from_yaml(
            "minzoom: 2\nmaxzoom: 12\njob_check_limit: 1024\n",
        )
        .unwrap();
        assert_eq!(PlanConfig::new(2, 12, 256, 1024), config);

        match PlanConfig::from_yaml("minzoom: 2\nmaxzoom: 1\njob_check_limit: 4\n") {
            Err(Error::InvalidConfig(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        match PlanConfig::from_yaml("minzoom: [") {
            Err(Error::Config(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_plan_zoom_rejects_zoom_past_grid_limit() {
        assert!(matches!(
            plan_zoom(&[GeoPoint::new(0.0, 0.0)], 32, 256, u64::MAX),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            plan_zoom(&[GeoPoint::new(179.0, 10.0)], 40, 256, 1_000_000),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_plan_zoom_single_batch() {
        let jobs = plan_zoom(&world(), 2, 256, 8).unwrap();
        assert_eq!(2, jobs.len());
        assert_eq!(TileRect::new(0, 0, 2, 4), jobs[0].rect);
        assert_eq!(TileRect::new(2, 0, 4, 4), jobs[1].rect);

        assert!(plan_zoom(&[], 7, 256, 8).unwrap().is_empty());
        assert!(matches!(
            plan_zoom(&world(), 2, 256, 0),
            Err(Error::InvalidConfig(_))
        ));
    }

    proptest! {
        #[test]
        fn test_jobs_tile_the_bounds(
            coords in prop::collection::vec((-180.0..180.0_f64, -89.0..89.0_f64), 1..20),
            zoom in 0u8..=5,
            limit in 1u64..64
        ) {
            let points: Vec<GeoPoint> = coords.iter().map(|(lon, lat)| GeoPoint::new(*lon, *lat)).collect();
            let bounds = aggregate(&points, zoom).unwrap();

            let jobs = plan_zoom_range(&points, zoom, zoom, 256, limit).unwrap();
            prop_assert!(jobs.iter().all(|job| job.tile_count() >= 1 && job.tile_count() <= limit));

            let mut seen = HashSet::new();
            for job in jobs.iter() {
                for tile in job.tiles() {
                    prop_assert!(bounds.contains(*tile));
                    prop_assert!(seen.insert(*tile), "tile {:?} covered twice", tile);
                }
            }
            prop_assert_eq!(bounds.tile_count(), seen.len() as u64);
        }
    }
}
