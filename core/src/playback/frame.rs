use crate::prelude::{PlaybackError, PlaybackResult};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use ndarray::Array3;

const RGB: usize = 3;

/// Decoded frame at the source's native size, packed 8-bit RGB.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RawFrame {
    /// Frame filled with one colour, mostly useful for synthetic sources.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * RGB)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }
}

/// Frame ready for display: RGBA at the target resolution with samples in
/// `[0, 1]`, shaped `(height, width, 4)`.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Playback session that produced the frame.
    pub session: u64,
    /// Position of the frame within its session.
    pub index: u64,
    /// Timeline position of the frame, in seconds.
    pub elapsed: f64,
    pub pixels: Array3<f32>,
}

/// Converts to RGBA, resizes to `width` x `height` and normalizes to `[0, 1]`.
pub fn prepare(raw: RawFrame, width: u32, height: u32) -> PlaybackResult<Array3<f32>> {
    let expected = raw.width as usize * raw.height as usize * RGB;
    if raw.width == 0 || raw.height == 0 || raw.data.len() != expected {
        return Err(PlaybackError::Decode(format!(
            "frame {}x{} carries {} bytes, expected {}",
            raw.width,
            raw.height,
            raw.data.len(),
            expected
        )));
    }

    let rgba = raw
        .data
        .chunks_exact(RGB)
        .flat_map(|px| [px[0], px[1], px[2], u8::MAX])
        .collect();
    let image = RgbaImage::from_raw(raw.width, raw.height, rgba)
        .ok_or_else(|| PlaybackError::Decode("frame buffer size mismatch".into()))?;
    let image = if image.dimensions() == (width, height) {
        image
    } else {
        imageops::resize(&image, width, height, FilterType::Triangle)
    };

    let samples = image
        .into_raw()
        .into_iter()
        .map(|value| f32::from(value) / 255.0)
        .collect();
    Array3::from_shape_vec((height as usize, width as usize, 4), samples)
        .map_err(|err| PlaybackError::Decode(err.to_string()))
}
