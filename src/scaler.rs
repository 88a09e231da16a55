//! Scales a frame to fit the display while preserving its aspect ratio.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use thiserror::Error;

use crate::display::DisplayTarget;

#[derive(Debug, PartialEq, Error)]
pub enum ScaleError {
    #[error("frame has zero dimensions")]
    EmptyFrame,
    #[error("display target has zero dimensions")]
    EmptyTarget,
    #[error("computed scale factor {0} is unusable")]
    BadScale(f64),
}

/// One scaled frame, alive for a single tick. Ownership moves to the sink and
/// the buffer is discarded afterwards; nothing is cached across ticks.
#[derive(Debug)]
pub struct ScaledRaster {
    frame_index: usize,
    pixels: RgbaImage,
}

impl ScaledRaster {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Index of the source frame this raster was scaled from.
    #[must_use]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Scales `frame` to fit inside `target` without distortion.
///
/// `scale = min(target.width / frame.width, target.height / frame.height)`,
/// output dimensions rounded, resampled with the bicubic Catmull-Rom filter.
/// Output never exceeds the target bounds on either axis and never upscales
/// past them.
///
/// # Errors
/// [`ScaleError`] if the frame or target has a zero dimension, or the scale
/// factor comes out non-finite or non-positive. Given a valid [`FrameStore`]
/// these cannot occur.
///
/// [`FrameStore`]: crate::store::FrameStore
pub fn scale_to_fit(
    frame: &RgbaImage,
    target: &DisplayTarget,
    frame_index: usize,
) -> Result<ScaledRaster, ScaleError> {
    let (fw, fh) = frame.dimensions();
    if fw == 0 || fh == 0 {
        return Err(ScaleError::EmptyFrame);
    }
    if target.width == 0 || target.height == 0 {
        return Err(ScaleError::EmptyTarget);
    }

    let scale = f64::min(
        f64::from(target.width) / f64::from(fw),
        f64::from(target.height) / f64::from(fh),
    );
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ScaleError::BadScale(scale));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let width = ((f64::from(fw) * scale).round() as u32).max(1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = ((f64::from(fh) * scale).round() as u32).max(1);

    let pixels = imageops::resize(frame, width, height, FilterType::CatmullRom);
    Ok(ScaledRaster {
        frame_index,
        pixels,
    })
}
