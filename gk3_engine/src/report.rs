use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gk3_walker::{PathOutcome, SearchStrategy, WalkableRegion};
use glam::Vec3;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PathReport {
    pub scene: String,
    pub strategy: SearchStrategy,
    pub from: [f32; 3],
    pub to: [f32; 3],
    pub found: bool,
    pub start_cell: Option<[i32; 2]>,
    pub goal_cell: Option<[i32; 2]>,
    /// World positions from the first step after `from` through the goal.
    pub waypoints: Vec<[f32; 3]>,
    pub length: f32,
    pub stats: StatsReport,
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub attempts: u32,
    pub expanded: usize,
    pub node_skip: u32,
    pub capped: bool,
}

#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub position: [f32; 3],
    pub cell: [i32; 2],
    pub walkable: bool,
    pub region: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct NearestReport {
    pub query: [f32; 3],
    pub snapped: [f32; 3],
    pub cell: [i32; 2],
    pub moved: bool,
}

impl PathReport {
    pub fn new(
        scene: &Path,
        region: &WalkableRegion,
        from: Vec3,
        to: Vec3,
        outcome: &PathOutcome,
    ) -> Self {
        Self {
            scene: scene.display().to_string(),
            strategy: region.pathfinding().strategy,
            from: from.to_array(),
            to: to.to_array(),
            found: outcome.found,
            start_cell: outcome.start_cell.map(|cell| cell.to_array()),
            goal_cell: outcome.goal_cell.map(|cell| cell.to_array()),
            waypoints: outcome
                .path
                .waypoints()
                .iter()
                .map(|point| point.to_array())
                .collect(),
            length: outcome.path.length_from(from),
            stats: StatsReport {
                attempts: outcome.stats.attempts,
                expanded: outcome.stats.expanded,
                node_skip: outcome.stats.node_skip,
                capped: outcome.stats.capped,
            },
        }
    }
}

impl ProbeReport {
    pub fn new(region: &WalkableRegion, position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            cell: region.world_to_raster(position).to_array(),
            walkable: region.is_world_walkable(position),
            region: region.region_index(position),
        }
    }
}

impl NearestReport {
    pub fn new(region: &WalkableRegion, query: Vec3) -> Self {
        let snapped = region.find_nearest_walkable_position(query);
        Self {
            query: query.to_array(),
            snapped: snapped.to_array(),
            cell: region.world_to_raster(snapped).to_array(),
            moved: snapped != query,
        }
    }
}

pub fn write_json<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(report).context("serializing report to JSON")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
