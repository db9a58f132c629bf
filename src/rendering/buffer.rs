//! RGBA pixel storage.

use crate::{Dimensions, Error, Result};

/// Flat RGBA raster.
///
/// Row-major with the origin at the bottom-left: pixel `(x, y)` starts at
/// byte `(y * width + x) * 4`. The length is always `width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer, reporting allocation failure instead of aborting.
    pub fn allocate(width: u32, height: u32) -> Result<Self> {
        let failed = || Error::BufferAllocationFailed { width, height };
        let len = Dimensions::new(width, height).rgba_len().ok_or_else(failed)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| failed())?;
        data.resize(len, 0);

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize * self.width as usize + x as usize) * 4)
        } else {
            None
        }
    }

    /// RGBA of pixel `(x, y)`, counted from the bottom-left.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.offset(x, y).map(|o| {
            let mut px = [0u8; 4];
            px.copy_from_slice(&self.data[o..o + 4]);
            px
        })
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(o) = self.offset(x, y) {
            self.data[o..o + 4].copy_from_slice(&rgba);
        }
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }
}
