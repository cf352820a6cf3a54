use std::fs;
use std::path::Path;

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, ImageFormat};

use crate::error::{Result, WalkerError};

/// Palette index reserved for "totally not OK to walk" (black in the
/// boundary art).
pub const BLOCKED_INDEX: u8 = 255;

/// Raster source backing a walker boundary.
///
/// Row 0 is the top of the image. Lookups outside the raster return `None`.
pub trait WalkerMask {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn palette_index(&self, x: i32, y: i32) -> Option<u8>;

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }
}

/// One palette index per cell, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedMask {
    width: u32,
    height: u32,
    cells: Vec<u8>,
}

impl IndexedMask {
    pub fn new(width: u32, height: u32, cells: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(WalkerError::EmptyMask { width, height });
        }
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(WalkerError::MaskLength {
                width,
                height,
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn filled(width: u32, height: u32, value: u8) -> Result<Self> {
        Self::new(width, height, vec![value; width as usize * height as usize])
    }

    /// Builds a mask from top-to-bottom rows; every row must have the same length.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self>
    where
        R: AsRef<[u8]>,
    {
        let width = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != width {
                return Err(WalkerError::RaggedRow {
                    row,
                    expected: width,
                    actual: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }
        Self::new(width as u32, rows.len() as u32, cells)
    }

    /// Decodes a PNG whose luma channel carries the palette index of each cell.
    pub fn decode_png(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        let luma = image.to_luma8();
        let (width, height) = luma.dimensions();
        Self::new(width, height, luma.into_raw())
    }

    pub fn open_png(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|err| WalkerError::io(path, err))?;
        Self::decode_png(&bytes)
    }

    /// Encodes the mask as an 8-bit grayscale PNG, the inverse of [`Self::decode_png`].
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(
            &self.cells,
            self.width,
            self.height,
            ColorType::L8.into(),
        )?;
        Ok(out)
    }

    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) as usize;
            self.cells[idx] = value;
        }
    }

}

impl WalkerMask for IndexedMask {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn palette_index(&self, x: i32, y: i32) -> Option<u8> {
        if !self.contains(x, y) {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.cells.get(idx).copied()
    }
}
