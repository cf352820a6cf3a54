use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use gk3_walker::{IndexedMask, NamedRect, WalkableRegion, WalkerBoundaryConfig, WalkerMask};
use log::{debug, info};

use crate::cli::SearchOverrides;

/// A scene's walker boundary, loaded and ready for queries.
pub struct SceneBoundary {
    pub config: WalkerBoundaryConfig,
    pub region: WalkableRegion,
}

impl SceneBoundary {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = WalkerBoundaryConfig::from_json_file(config_path)
            .with_context(|| format!("loading walker config {}", config_path.display()))?;
        let mask = IndexedMask::open_png(&config.mask)
            .with_context(|| format!("loading boundary mask {}", config.mask.display()))?;
        info!(
            "loaded walker boundary {} ({}x{} cells over {}x{} world units)",
            config.mask.display(),
            mask.width(),
            mask.height(),
            config.size[0],
            config.size[1]
        );
        let region = WalkableRegion::from_config(&config, Rc::new(mask));
        Ok(Self {
            config,
            region,
        })
    }

    pub fn apply_overrides(&mut self, overrides: &SearchOverrides) {
        let mut settings = self.region.pathfinding().clone();
        if let Some(strategy) = overrides.strategy {
            settings.strategy = strategy;
        }
        if let Some(node_skip) = overrides.node_skip {
            settings.node_skip = node_skip;
        }
        if let Some(max_expansions) = overrides.max_expansions {
            settings.max_expansions = Some(max_expansions);
        }
        debug!("pathfinding settings: {settings:?}");
        self.region.set_pathfinding(settings);
    }

    pub fn block_regions(&mut self, pairs: &[(u8, u8)]) {
        for &(region, boundary) in pairs {
            self.region.set_region_blocked(region, boundary, true);
        }
    }

    pub fn add_exclusions(&mut self, rects: &[NamedRect]) {
        for named in rects {
            self.region.set_unwalkable_rect(&named.name, named.rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use gk3_walker::{SearchStrategy, WorldRect};
    use glam::{IVec2, Vec3};

    use super::*;

    fn load_scene(pathfinding: &str) -> (tempfile::TempDir, SceneBoundary) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mask = IndexedMask::filled(4, 4, 10).expect("mask");
        fs::write(dir.path().join("floor.png"), mask.encode_png().expect("png")).expect("mask");
        let config = format!(
            r#"{{ "mask": "floor.png", "size": [40, 40], "pathfinding": {pathfinding} }}"#
        );
        let path = dir.path().join("scene.json");
        fs::write(&path, config).expect("config");
        let scene = SceneBoundary::load(&path).expect("scene");
        (dir, scene)
    }

    #[test]
    fn overrides_replace_only_what_they_name() {
        let (_dir, mut scene) = load_scene(r#"{ "node_skip": 4, "max_expansions": 50 }"#);
        scene.apply_overrides(&SearchOverrides {
            strategy: Some(SearchStrategy::BreadthFirst),
            ..SearchOverrides::default()
        });
        let settings = scene.region.pathfinding();
        assert_eq!(settings.strategy, SearchStrategy::BreadthFirst);
        assert_eq!(settings.node_skip, 4);
        assert_eq!(settings.max_expansions, Some(50));

        scene.apply_overrides(&SearchOverrides {
            node_skip: Some(2),
            max_expansions: Some(7),
            ..SearchOverrides::default()
        });
        let settings = scene.region.pathfinding();
        assert_eq!(settings.strategy, SearchStrategy::BreadthFirst);
        assert_eq!(settings.node_skip, 2);
        assert_eq!(settings.max_expansions, Some(7));
    }

    #[test]
    fn dynamic_blocking_reaches_the_region() {
        let (_dir, mut scene) = load_scene("{}");
        scene.block_regions(&[(10, 11)]);
        assert!(scene.region.blocked_categories().contains(&10));
        assert!(!scene.region.is_raster_walkable(IVec2::new(1, 1)));

        let (_dir, mut scene) = load_scene("{}");
        scene.add_exclusions(&[NamedRect {
            name: "crate".to_string(),
            rect: WorldRect::new(0.0, 0.0, 10.0, 10.0),
        }]);
        assert!(!scene.region.is_world_walkable(Vec3::new(5.0, 0.0, 5.0)));
        assert!(scene.region.is_world_walkable(Vec3::new(15.0, 0.0, 15.0)));
    }
}
