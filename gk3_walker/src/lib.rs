//! Walker boundary pathfinding.
//!
//! A scene's walkable floor is described by a small indexed mask stretched
//! over the ground plane. [`WalkableRegion`] owns the mapping between world
//! and mask space and answers walkability queries; [`PathPlanner`] searches
//! the mask for a walk between two world positions.

pub mod config;
pub mod error;
pub mod mask;
pub mod nearest;
pub mod planner;
pub mod rect;
pub mod region;

pub use config::{PathfindingSettings, SearchStrategy, WalkerBoundaryConfig};
pub use error::{Result, WalkerError};
pub use mask::{IndexedMask, WalkerMask, BLOCKED_INDEX};
pub use nearest::nearest_walkable_cell;
pub use planner::{CellPath, PathOutcome, PathPlanner, SearchStats, WalkPath};
pub use rect::{NamedRect, WorldRect};
pub use region::{WalkableRegion, DEFAULT_BLOCKED_CATEGORIES};
