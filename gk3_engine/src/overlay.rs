use std::fs::{self, File};
use std::path::Path;

use anyhow::{anyhow, ensure, Context, Result};
use gk3_walker::{WalkPath, WalkableRegion};
use glam::IVec2;
use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};

const BLOCKED: [u8; 4] = [96, 16, 16, 255];
const EXCLUDED: [u8; 4] = [40, 70, 170, 255];
const PATH: [u8; 4] = [40, 220, 60, 255];
const START: [u8; 4] = [250, 220, 40, 255];
const GOAL: [u8; 4] = [230, 60, 220, 255];

/// RGBA picture of a region: walkable cells shaded by cost (cheap is
/// bright), blocked categories in red, exclusion rects in blue, and an
/// optional path drawn over the top.
pub struct Overlay {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Overlay {
    pub fn render(region: &WalkableRegion) -> Result<Self> {
        let mask = region
            .mask()
            .ok_or_else(|| anyhow!("region has no boundary mask to draw"))?;
        let (width, height) = (mask.width(), mask.height());
        let mut overlay = Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        };

        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let cell = IVec2::new(x, y);
                let value = region.cell_value(cell).unwrap_or(u8::MAX);
                let color = if region.blocked_categories().contains(&value) {
                    BLOCKED
                } else if !region.is_raster_walkable(cell) {
                    EXCLUDED
                } else {
                    let shade = u8::MAX - value;
                    [shade, shade, shade, 255]
                };
                overlay.put(cell, color);
            }
        }
        Ok(overlay)
    }

    pub fn draw_path(&mut self, region: &WalkableRegion, start: Option<IVec2>, path: &WalkPath) {
        for point in path.waypoints() {
            self.put(region.world_to_raster(*point), PATH);
        }
        if let Some(cell) = start {
            self.put(cell, START);
        }
        if let Some(goal) = path.destination() {
            self.put(region.world_to_raster(goal), GOAL);
        }
    }

    fn put(&mut self, cell: IVec2, color: [u8; 4]) {
        if cell.x < 0 || cell.y < 0 || cell.x as u32 >= self.width || cell.y as u32 >= self.height
        {
            return;
        }
        let idx = (cell.y as usize * self.width as usize + cell.x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&color);
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(out)
    }

    pub fn save(&self, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        export_rgba_to_png(destination, self.width, self.height, &self.pixels)
    }
}

fn export_rgba_to_png(path: &Path, width: u32, height: u32, data: &[u8]) -> Result<()> {
    ensure!(
        data.len() == width as usize * height as usize * 4,
        "overlay buffer is {} bytes, expected {}x{} RGBA",
        data.len(),
        width,
        height
    );
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let encoder = PngEncoder::new(file);
    encoder
        .write_image(data, width, height, ColorType::Rgba8.into())
        .with_context(|| format!("writing PNG to {}", path.display()))?;
    Ok(())
}
