//! Conversion of raw RGBA buffers into caller-facing image tensors.

use sha2::{Digest, Sha256};

/// Number of channels in an [`ImageTensor`].
pub const CHANNELS: usize = 3;

/// Buffer byte feeding each tensor channel.
///
/// The buffer is laid out as (channel, column, row); it is read back as
/// (row, column, channel), the `{2, 1, 0}` axis permutation, after which the
/// fourth channel is discarded. Channels therefore keep their RGB order.
pub const CHANNEL_SOURCE: [usize; CHANNELS] = [0, 1, 2];

/// A `(3, height, width)` array of 8-bit RGB samples, top-left origin.
///
/// Storage is planar: all red samples row by row, then green, then blue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTensor {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Convert a bottom-left-origin RGBA buffer into an [`ImageTensor`].
///
/// `buffer` must hold `width * height * 4` bytes.
pub fn extract(buffer: &[u8], width: u32, height: u32) -> ImageTensor {
    let (w, h) = (width as usize, height as usize);
    debug_assert_eq!(buffer.len(), w * h * 4, "buffer does not match dimensions");

    let plane = w * h;
    let mut data = vec![0u8; CHANNELS * plane];
    for row in 0..h {
        // tensor row 0 is the top, which is the last row of the buffer
        let src_row = &buffer[(h - 1 - row) * w * 4..(h - row) * w * 4];
        for (col, px) in src_row.chunks_exact(4).enumerate() {
            for (c, &src) in CHANNEL_SOURCE.iter().enumerate() {
                data[c * plane + row * w + col] = px[src];
            }
        }
    }

    ImageTensor {
        width: w,
        height: h,
        data,
    }
}

impl ImageTensor {
    /// `(channels, height, width)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (CHANNELS, self.height, self.width)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at `(channel, row, col)`, rows counted from the top.
    pub fn get(&self, channel: usize, row: usize, col: usize) -> Option<u8> {
        if channel < CHANNELS && row < self.height && col < self.width {
            Some(self.data[channel * self.width * self.height + row * self.width + col])
        } else {
            None
        }
    }

    /// One channel plane, row-major from the top.
    pub fn channel(&self, channel: usize) -> &[u8] {
        let plane = self.width * self.height;
        &self.data[channel * plane..(channel + 1) * plane]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Interleaved RGB pixels, row-major from the top.
    pub fn to_rgb_interleaved(&self) -> Vec<u8> {
        let plane = self.width * self.height;
        let mut out = Vec::with_capacity(plane * CHANNELS);
        for i in 0..plane {
            for c in 0..CHANNELS {
                out.push(self.data[c * plane + i]);
            }
        }
        out
    }

    /// Copy into an `image` RGB buffer, e.g. for PNG encoding.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(
            self.width as u32,
            self.height as u32,
            self.to_rgb_interleaved(),
        )
    }

    /// Hex SHA-256 over the shape and samples.
    pub fn sha256_hex(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.height as u64).to_le_bytes());
        hasher.update((self.width as u64).to_le_bytes());
        hasher.update(&self.data);
        hex::encode(hasher.finalize())
    }
}
