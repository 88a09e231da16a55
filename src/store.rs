//! Loads an animated GIF and hands out its frames.
//!
//! The whole file is read into memory before decoding, so no handle on the
//! source file outlives [`FrameStore::open`] and the file stays free for the
//! rest of the run.

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Frame, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum StoreError {
    /// Bad path, unsupported format, or an image that decodes to no frames.
    #[error("cannot use \"{path}\" as an animated wallpaper: {reason}")]
    InvalidInput { path: PathBuf, reason: String },
    /// Frame index outside `[0, frame_count)`. A closed store reports a zero
    /// count.
    #[error("frame index {index} out of range, image has {count} frames")]
    OutOfRange { index: usize, count: usize },
}

/// Decoded animated image.
///
/// `select_frame` moves an active-frame cursor, mirroring how multi-frame
/// containers are traversed; callers must serialize access to it.
pub struct FrameStore {
    frames: Option<Vec<Frame>>,
    current: usize,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for FrameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStore")
            .field("frame_count", &self.frame_count())
            .field("current", &self.current)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl FrameStore {
    /// Opens and fully decodes an animated GIF.
    ///
    /// # Errors
    /// [`StoreError::InvalidInput`] if the path does not point to a readable
    /// `.gif` file (extension checked case-insensitively) or the image holds
    /// no frames.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let invalid = |reason: String| StoreError::InvalidInput {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(invalid("no such file".to_string()));
        }
        let supported = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));
        if !supported {
            return Err(invalid("not a .gif file".to_string()));
        }

        let bytes = std::fs::read(path).map_err(|err| invalid(err.to_string()))?;
        let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(|err| invalid(err.to_string()))?;
        // The decoder composites every frame onto the full logical screen, so
        // dimensions are constant across frames.
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|err| invalid(err.to_string()))?;
        let Some(first) = frames.first() else {
            return Err(invalid("image has no frames".to_string()));
        };
        let (width, height) = first.buffer().dimensions();

        Ok(Self {
            frames: Some(frames),
            current: 0,
            width,
            height,
        })
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.as_ref().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn current_frame_index(&self) -> usize {
        self.current
    }

    /// Selects the active frame and returns its pixel buffer.
    ///
    /// This is a stateful select, not a pure accessor: the cursor moves to
    /// `index`.
    ///
    /// # Errors
    /// [`StoreError::OutOfRange`] if `index` is not below the frame count.
    pub fn select_frame(&mut self, index: usize) -> Result<&RgbaImage, StoreError> {
        let count = self.frame_count();
        let Some(frame) = self.frames.as_ref().and_then(|frames| frames.get(index)) else {
            return Err(StoreError::OutOfRange { index, count });
        };
        self.current = index;
        Ok(frame.buffer())
    }

    /// Releases all decoded frames. Safe to call more than once.
    pub fn close(&mut self) {
        self.frames = None;
    }
}
