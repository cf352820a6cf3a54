//! Walkable floor of a scene.
//!
//! The boundary mask is a small indexed texture laid over the ground plane.
//! Each cell's palette index doubles as a traversal cost and as a region id
//! for scene logic; index 255 (black) and a handful of configurable indices
//! are never walkable. Scene logic can also drop named rectangles onto the
//! floor to block it temporarily.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use glam::{IVec2, Vec2, Vec3};
use log::trace;

use crate::config::{PathfindingSettings, WalkerBoundaryConfig};
use crate::mask::{WalkerMask, BLOCKED_INDEX};
use crate::rect::{NamedRect, WorldRect};

/// Indices blocked on every new region: black, plus the two edge bands
/// that hug the boundary and look wrong to stand in.
pub const DEFAULT_BLOCKED_CATEGORIES: [u8; 3] = [BLOCKED_INDEX, 9, 8];

pub struct WalkableRegion {
    mask: Option<Rc<dyn WalkerMask>>,
    size: Vec2,
    offset: Vec2,
    floor_height: f32,
    blocked_categories: BTreeSet<u8>,
    unwalkable_rects: Vec<NamedRect>,
    pathfinding: PathfindingSettings,
}

impl WalkableRegion {
    pub fn new(mask: Rc<dyn WalkerMask>, size: Vec2, offset: Vec2) -> Self {
        Self {
            mask: Some(mask),
            ..Self::without_mask(size, offset)
        }
    }

    /// A region with no boundary texture; every position is walkable.
    pub fn without_mask(size: Vec2, offset: Vec2) -> Self {
        Self {
            mask: None,
            size,
            offset,
            floor_height: 0.0,
            blocked_categories: DEFAULT_BLOCKED_CATEGORIES.into_iter().collect(),
            unwalkable_rects: Vec::new(),
            pathfinding: PathfindingSettings::default(),
        }
    }

    /// Builds the region a scene describes, applying its initial blocking.
    pub fn from_config(config: &WalkerBoundaryConfig, mask: Rc<dyn WalkerMask>) -> Self {
        let mut region = Self::new(mask, config.size(), config.offset());
        region.floor_height = config.floor_height;
        region.pathfinding = config.pathfinding.clone();
        for &(index, boundary) in &config.blocked_regions {
            region.set_region_blocked(index, boundary, true);
        }
        for named in &config.unwalkable_rects {
            region.set_unwalkable_rect(&named.name, named.rect);
        }
        region
    }

    pub fn mask(&self) -> Option<&dyn WalkerMask> {
        self.mask.as_deref()
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn floor_height(&self) -> f32 {
        self.floor_height
    }

    pub fn set_floor_height(&mut self, height: f32) {
        self.floor_height = height;
    }

    pub fn pathfinding(&self) -> &PathfindingSettings {
        &self.pathfinding
    }

    pub fn set_pathfinding(&mut self, settings: PathfindingSettings) {
        self.pathfinding = settings;
    }

    /// Maps a world position onto the mask. The result may lie outside the
    /// raster when the position is outside the mapped floor.
    pub fn world_to_raster(&self, world: Vec3) -> IVec2 {
        let Some(mask) = self.mask() else {
            return IVec2::ZERO;
        };
        let width = mask.width() as f32;
        let height = mask.height() as f32;

        // Offset moves the point into the boundary's lower-left frame.
        let normalized_x = (world.x + self.offset.x) / self.size.x;
        let normalized_z = (world.z + self.offset.y) / self.size.y;

        let column = normalized_x * width;
        // Normalized space is bottom-up, raster rows are top-down.
        let row = height - normalized_z * height;
        IVec2::new(column as i32, row as i32)
    }

    /// Maps a cell back to the world position of its centre.
    pub fn raster_to_world(&self, cell: IVec2) -> Vec3 {
        let Some(mask) = self.mask() else {
            return Vec3::new(0.0, self.floor_height, 0.0);
        };
        let width = mask.width() as f32;
        let height = mask.height() as f32;

        let column = cell.x as f32 + 0.5;
        let row = height - (cell.y as f32 + 0.5);

        let x = column / width * self.size.x - self.offset.x;
        let z = row / height * self.size.y - self.offset.y;
        Vec3::new(x, self.floor_height, z)
    }

    /// A position is walkable when its cell is and no exclusion rect covers
    /// the position itself.
    pub fn is_world_walkable(&self, world: Vec3) -> bool {
        if self.mask().is_none() {
            return true;
        }
        !self.in_unwalkable_rect(world) && self.is_raster_walkable(self.world_to_raster(world))
    }

    pub fn is_raster_walkable(&self, cell: IVec2) -> bool {
        let Some(mask) = self.mask() else {
            return true;
        };
        match mask.palette_index(cell.x, cell.y) {
            None => false,
            Some(index) if self.blocked_categories.contains(&index) => false,
            Some(_) => !self.cell_under_unwalkable_rect(cell),
        }
    }

    /// World-space area a cell covers on the ground plane, `None` without a
    /// mask.
    pub fn cell_footprint(&self, cell: IVec2) -> Option<WorldRect> {
        let mask = self.mask()?;
        let width = mask.width() as f32;
        let height = mask.height() as f32;

        let left = cell.x as f32 * self.size.x / width - self.offset.x;
        let right = (cell.x + 1) as f32 * self.size.x / width - self.offset.x;
        // Row 0 is the far (high z) edge of the floor.
        let far = (height - cell.y as f32) * self.size.y / height - self.offset.y;
        let near = (height - (cell.y + 1) as f32) * self.size.y / height - self.offset.y;
        Some(WorldRect::from_corners((left, near), (right, far)))
    }

    /// Raw palette index under a cell, ignoring every blocking rule.
    pub fn cell_value(&self, cell: IVec2) -> Option<u8> {
        self.mask()?.palette_index(cell.x, cell.y)
    }

    /// Region id of the floor under a world position, `None` off the mask.
    pub fn region_index(&self, world: Vec3) -> Option<u8> {
        self.cell_value(self.world_to_raster(world))
    }

    /// Blocks or unblocks a floor region together with the boundary band
    /// that surrounds it. Index 255 stays blocked regardless.
    pub fn set_region_blocked(&mut self, region: u8, boundary: u8, blocked: bool) {
        trace!("walker region {region}/{boundary} blocked={blocked}");
        for index in [region, boundary] {
            if blocked {
                self.blocked_categories.insert(index);
            } else if index != BLOCKED_INDEX {
                self.blocked_categories.remove(&index);
            }
        }
    }

    pub fn blocked_categories(&self) -> &BTreeSet<u8> {
        &self.blocked_categories
    }

    /// Inserts a named exclusion, replacing any rect already under `name`.
    pub fn set_unwalkable_rect(&mut self, name: &str, rect: WorldRect) {
        if let Some(existing) = self
            .unwalkable_rects
            .iter_mut()
            .find(|named| named.name == name)
        {
            existing.rect = rect;
            return;
        }
        self.unwalkable_rects.push(NamedRect {
            name: name.to_string(),
            rect,
        });
    }

    pub fn clear_unwalkable_rect(&mut self, name: &str) -> bool {
        let before = self.unwalkable_rects.len();
        self.unwalkable_rects.retain(|named| named.name != name);
        self.unwalkable_rects.len() != before
    }

    pub fn unwalkable_rects(&self) -> &[NamedRect] {
        &self.unwalkable_rects
    }

    fn in_unwalkable_rect(&self, world: Vec3) -> bool {
        self.unwalkable_rects
            .iter()
            .any(|named| named.rect.contains_world(world))
    }

    fn cell_under_unwalkable_rect(&self, cell: IVec2) -> bool {
        if self.unwalkable_rects.is_empty() {
            return false;
        }
        let Some(footprint) = self.cell_footprint(cell) else {
            return false;
        };
        self.unwalkable_rects
            .iter()
            .any(|named| named.rect.overlaps(&footprint))
    }
}

impl fmt::Debug for WalkableRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkableRegion")
            .field(
                "mask",
                &self.mask().map(|mask| (mask.width(), mask.height())),
            )
            .field("size", &self.size)
            .field("offset", &self.offset)
            .field("floor_height", &self.floor_height)
            .field("blocked_categories", &self.blocked_categories)
            .field("unwalkable_rects", &self.unwalkable_rects)
            .finish()
    }
}
