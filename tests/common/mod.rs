//! Do some preparations for integration tests

#![allow(dead_code)]

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, Rgba, RgbaImage};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gifpaper::display::{DisplayError, DisplaySource, DisplayTarget};
use gifpaper::scaler::ScaledRaster;
use gifpaper::sink::{Scope, SinkError, WallpaperSink};

pub fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes a small animated GIF with the given frame count and dimensions,
/// each frame a distinct solid colour.
pub fn fixture_gif(dir: &Path, frames: u32, width: u32, height: u32) -> PathBuf {
    let path = dir.join("fixture.gif");
    let file = File::create(&path).expect("cannot create fixture gif");
    let mut encoder = GifEncoder::new(file);
    let frames: Vec<Frame> = (0..frames)
        .map(|n| {
            #[allow(clippy::cast_possible_truncation)]
            let shade = (n * 50) as u8;
            let buffer = RgbaImage::from_pixel(width, height, Rgba([shade, 128, 255 - shade, 255]));
            Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(100, 1))
        })
        .collect();
    encoder
        .encode_frames(frames)
        .expect("cannot encode fixture gif");
    path
}

/// Display source returning a fixed target, standing in for the live query.
pub struct FixedDisplay(pub DisplayTarget);

impl FixedDisplay {
    pub fn full_hd() -> Self {
        Self(DisplayTarget {
            width: 1920,
            height: 1080,
            dpi_scale: 1.0,
        })
    }
}

impl DisplaySource for FixedDisplay {
    fn current(&self) -> Result<DisplayTarget, DisplayError> {
        Ok(self.0)
    }
}

/// Records every applied raster as (frame index, width, height).
pub struct RecordingSink {
    applied: Arc<Mutex<Vec<(usize, u32, u32)>>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<Vec<(usize, u32, u32)>>>) {
        let applied = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                applied: applied.clone(),
            },
            applied,
        )
    }
}

impl WallpaperSink for RecordingSink {
    fn apply(&self, raster: &ScaledRaster, _scope: Scope) -> Result<(), SinkError> {
        self.applied.lock().unwrap().push((
            raster.frame_index(),
            raster.width(),
            raster.height(),
        ));
        Ok(())
    }
}

/// Fails exactly one apply call (by zero-based call number), records the rest.
pub struct FlakySink {
    fail_on_call: usize,
    calls: AtomicUsize,
    applied: Arc<Mutex<Vec<usize>>>,
}

impl FlakySink {
    pub fn new(fail_on_call: usize) -> (Self, Arc<Mutex<Vec<usize>>>) {
        let applied = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                fail_on_call,
                calls: AtomicUsize::new(0),
                applied: applied.clone(),
            },
            applied,
        )
    }
}

impl WallpaperSink for FlakySink {
    fn apply(&self, raster: &ScaledRaster, _scope: Scope) -> Result<(), SinkError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_on_call {
            return Err(SinkError::Setter("injected failure".to_string()));
        }
        self.applied.lock().unwrap().push(raster.frame_index());
        Ok(())
    }
}
