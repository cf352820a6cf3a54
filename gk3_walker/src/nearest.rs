use glam::{IVec2, Vec3};
use log::trace;

use crate::region::WalkableRegion;

/// Closest walkable cell to `target` by Euclidean distance, or `None` when
/// the region has no mask or the mask has no walkable cell at all.
///
/// Boundary masks are a few hundred cells per side and this runs once per
/// path request, so the whole raster is scanned. Ties go to the cell seen
/// first in column-major order.
pub fn nearest_walkable_cell(region: &WalkableRegion, target: IVec2) -> Option<IVec2> {
    let mask = region.mask()?;
    if region.is_raster_walkable(target) {
        return Some(target);
    }

    let mut nearest = None;
    let mut nearest_distance_sq = i64::MAX;
    for x in 0..mask.width() as i32 {
        for y in 0..mask.height() as i32 {
            let cell = IVec2::new(x, y);
            if !region.is_raster_walkable(cell) {
                continue;
            }
            let dx = i64::from(x) - i64::from(target.x);
            let dy = i64::from(y) - i64::from(target.y);
            let distance_sq = dx * dx + dy * dy;
            if distance_sq < nearest_distance_sq {
                nearest = Some(cell);
                nearest_distance_sq = distance_sq;
            }
        }
    }
    nearest
}

impl WalkableRegion {
    /// Raster cell to use for a world position: its own cell when walkable,
    /// otherwise the nearest walkable one. Falls back to the origin cell when
    /// nothing is walkable.
    pub fn nearest_walkable_raster(&self, world: Vec3) -> IVec2 {
        let target = self.world_to_raster(world);
        if self.is_raster_walkable(target) {
            return target;
        }
        let cell = nearest_walkable_cell(self, target).unwrap_or(IVec2::ZERO);
        trace!(
            "walker snapped {:.3},{:.3} from cell {} to {}",
            world.x,
            world.z,
            target,
            cell
        );
        cell
    }

    /// Snaps a world position onto the walkable floor. Walkable positions
    /// come back untouched; others land on the centre of the nearest
    /// walkable cell.
    pub fn find_nearest_walkable_position(&self, world: Vec3) -> Vec3 {
        if self.is_world_walkable(world) {
            return world;
        }
        self.raster_to_world(self.nearest_walkable_raster(world))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::mask::{IndexedMask, WalkerMask};
    use crate::rect::WorldRect;

    fn region_from(mask: IndexedMask) -> WalkableRegion {
        let size = Vec2::new(mask.width() as f32 * 10.0, mask.height() as f32 * 10.0);
        WalkableRegion::new(Rc::new(mask), size, Vec2::ZERO)
    }

    #[test]
    fn single_walkable_cell_always_wins() {
        let mut mask = IndexedMask::filled(6, 5, 255).expect("mask");
        mask.set(4, 1, 20);
        let region = region_from(mask);
        let only = region.raster_to_world(IVec2::new(4, 1));

        for y in 0..5 {
            for x in 0..6 {
                let query = region.raster_to_world(IVec2::new(x, y));
                let snapped = region.find_nearest_walkable_position(query);
                assert!((snapped - only).length() < 1e-4, "query {x},{y}");
            }
        }
        let far = region.find_nearest_walkable_position(Vec3::new(-400.0, 0.0, 900.0));
        assert!((far - only).length() < 1e-4);
    }

    #[test]
    fn picks_the_closest_of_several() {
        let mut mask = IndexedMask::filled(9, 9, 255).expect("mask");
        mask.set(0, 0, 10);
        mask.set(8, 8, 10);
        mask.set(5, 3, 10);
        let region = region_from(mask);
        assert_eq!(
            nearest_walkable_cell(&region, IVec2::new(6, 4)),
            Some(IVec2::new(5, 3))
        );
        assert_eq!(
            nearest_walkable_cell(&region, IVec2::new(8, 7)),
            Some(IVec2::new(8, 8))
        );
    }

    #[test]
    fn ties_keep_the_first_cell_scanned() {
        let mut mask = IndexedMask::filled(3, 3, 255).expect("mask");
        mask.set(0, 1, 10);
        mask.set(2, 1, 10);
        let region = region_from(mask);
        assert_eq!(
            nearest_walkable_cell(&region, IVec2::new(1, 1)),
            Some(IVec2::new(0, 1))
        );
    }

    #[test]
    fn walkable_target_is_returned_unchanged() {
        let region = region_from(IndexedMask::filled(4, 4, 10).expect("mask"));
        let position = Vec3::new(12.3, 0.0, 27.1);
        assert_eq!(region.find_nearest_walkable_position(position), position);
        assert_eq!(
            nearest_walkable_cell(&region, IVec2::new(2, 2)),
            Some(IVec2::new(2, 2))
        );
    }

    #[test]
    fn exclusion_rects_push_the_snap_outward() {
        let mut region = region_from(IndexedMask::filled(5, 1, 10).expect("mask"));
        region.set_unwalkable_rect("prop", WorldRect::new(0.0, 0.0, 30.0, 10.0));
        let snapped = region.nearest_walkable_raster(Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(snapped, IVec2::new(3, 0));
    }

    #[test]
    fn fully_blocked_mask_falls_back_to_origin() {
        let region = region_from(IndexedMask::filled(4, 4, 255).expect("mask"));
        assert_eq!(nearest_walkable_cell(&region, IVec2::new(2, 2)), None);
        assert_eq!(
            region.nearest_walkable_raster(Vec3::new(15.0, 0.0, 15.0)),
            IVec2::ZERO
        );
    }

    #[test]
    fn no_mask_means_no_candidate() {
        let region = WalkableRegion::without_mask(Vec2::ONE, Vec2::ZERO);
        assert_eq!(nearest_walkable_cell(&region, IVec2::new(3, 3)), None);
        let position = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(region.find_nearest_walkable_position(position), position);
    }
}
