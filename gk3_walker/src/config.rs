//! Scene-level walker boundary settings.
//!
//! A scene names its boundary mask and the world extent the mask covers.
//! Everything else has a default so a minimal config is just `mask` + `size`.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalkerError};
use crate::rect::NamedRect;

/// Search flavour used by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Cost-weighted A* over the mask's palette indices.
    #[default]
    AStar,
    /// Unweighted breadth-first search; fewest steps, ignores cell cost.
    BreadthFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathfindingSettings {
    #[serde(default)]
    pub strategy: SearchStrategy,

    /// Grid stride of the first search attempt; halved after each failure.
    #[serde(default = "default_node_skip")]
    pub node_skip: u32,

    /// Give up an attempt after this many node expansions.
    #[serde(default)]
    pub max_expansions: Option<usize>,
}

impl Default for PathfindingSettings {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::default(),
            node_skip: default_node_skip(),
            max_expansions: None,
        }
    }
}

fn default_node_skip() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkerBoundaryConfig {
    /// Mask PNG, relative to the config file unless absolute.
    pub mask: PathBuf,
    pub size: [f32; 2],
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(default)]
    pub floor_height: f32,
    /// `(region, boundary)` pairs blocked when the scene loads.
    #[serde(default)]
    pub blocked_regions: Vec<(u8, u8)>,
    #[serde(default)]
    pub unwalkable_rects: Vec<NamedRect>,
    #[serde(default)]
    pub pathfinding: PathfindingSettings,
}

impl WalkerBoundaryConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config and rewrites `mask` to be relative to the caller.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| WalkerError::io(path, err))?;
        let mut config = Self::from_json_str(&text)?;
        if config.mask.is_relative() {
            if let Some(parent) = path.parent() {
                config.mask = parent.join(&config.mask);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let [width, depth] = self.size;
        if !(width.is_finite() && depth.is_finite()) || width <= 0.0 || depth <= 0.0 {
            return Err(WalkerError::InvalidConfig(format!(
                "size must be positive and finite (got {width}, {depth})"
            )));
        }
        if !self.offset.iter().all(|value| value.is_finite()) {
            return Err(WalkerError::InvalidConfig("offset must be finite".to_string()));
        }
        if self.pathfinding.node_skip == 0 {
            return Err(WalkerError::InvalidConfig(
                "node_skip must be at least 1".to_string(),
            ));
        }
        if let Some(bad) = self
            .unwalkable_rects
            .iter()
            .find(|named| !named.rect.has_area())
        {
            let rect = bad.rect;
            return Err(WalkerError::InvalidConfig(format!(
                "unwalkable rect '{}' needs a finite position and positive width and depth (got {}, {}, {}, {})",
                bad.name, rect.x, rect.z, rect.width, rect.depth
            )));
        }
        let mut names: Vec<&str> = self
            .unwalkable_rects
            .iter()
            .map(|named| named.name.as_str())
            .collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(WalkerError::InvalidConfig(format!(
                "duplicate unwalkable rect name '{}'",
                pair[0]
            )));
        }
        Ok(())
    }

    pub fn size(&self) -> Vec2 {
        Vec2::from(self.size)
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::from(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config =
            WalkerBoundaryConfig::from_json_str(r#"{ "mask": "floor.png", "size": [100, 80] }"#)
                .expect("config");
        assert_eq!(config.size(), Vec2::new(100.0, 80.0));
        assert_eq!(config.offset(), Vec2::ZERO);
        assert_eq!(config.pathfinding, PathfindingSettings::default());
        assert!(config.blocked_regions.is_empty());
    }

    #[test]
    fn parses_full_config() {
        let text = r#"{
            "mask": "floor.png",
            "size": [100.0, 100.0],
            "offset": [-5.0, 2.5],
            "floor_height": 1.5,
            "blocked_regions": [[3, 4]],
            "unwalkable_rects": [{ "name": "cart", "x": 10.0, "z": 10.0, "width": 5.0, "depth": 6.0 }],
            "pathfinding": { "strategy": "breadth_first", "node_skip": 4, "max_expansions": 5000 }
        }"#;
        let config = WalkerBoundaryConfig::from_json_str(text).expect("config");
        assert_eq!(config.blocked_regions, vec![(3, 4)]);
        assert_eq!(config.unwalkable_rects[0].name, "cart");
        assert_eq!(config.unwalkable_rects[0].rect.depth, 6.0);
        assert_eq!(config.pathfinding.strategy, SearchStrategy::BreadthFirst);
        assert_eq!(config.pathfinding.node_skip, 4);
        assert_eq!(config.pathfinding.max_expansions, Some(5000));
    }

    #[test]
    fn rejects_bad_values() {
        let zero_size = r#"{ "mask": "m.png", "size": [0, 10] }"#;
        assert!(matches!(
            WalkerBoundaryConfig::from_json_str(zero_size),
            Err(WalkerError::InvalidConfig(_))
        ));
        let zero_skip = r#"{ "mask": "m.png", "size": [1, 1], "pathfinding": { "node_skip": 0 } }"#;
        assert!(matches!(
            WalkerBoundaryConfig::from_json_str(zero_skip),
            Err(WalkerError::InvalidConfig(_))
        ));
        let dup = r#"{ "mask": "m.png", "size": [1, 1], "unwalkable_rects": [
            { "name": "a", "x": 0, "z": 0, "width": 1, "depth": 1 },
            { "name": "a", "x": 0, "z": 0, "width": 1, "depth": 1 }
        ] }"#;
        assert!(matches!(
            WalkerBoundaryConfig::from_json_str(dup),
            Err(WalkerError::InvalidConfig(_))
        ));
        for rect in [
            r#"{ "name": "flat", "x": 0, "z": 0, "width": 4, "depth": 0 }"#,
            r#"{ "name": "inside_out", "x": 0, "z": 0, "width": -4, "depth": 2 }"#,
        ] {
            let text = format!(r#"{{ "mask": "m.png", "size": [1, 1], "unwalkable_rects": [{rect}] }}"#);
            assert!(matches!(
                WalkerBoundaryConfig::from_json_str(&text),
                Err(WalkerError::InvalidConfig(_))
            ));
        }
        assert!(matches!(
            WalkerBoundaryConfig::from_json_str("{"),
            Err(WalkerError::ConfigParse(_))
        ));
    }

    #[test]
    fn mask_path_is_resolved_against_config_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scene.json");
        fs::write(&path, r#"{ "mask": "floor.png", "size": [10, 10] }"#).expect("write");
        let config = WalkerBoundaryConfig::from_json_file(&path).expect("config");
        assert_eq!(config.mask, dir.path().join("floor.png"));
    }
}
