//! Applies a scaled raster as the desktop background.
//!
//! The core only sees the [`WallpaperSink`] trait; one backend exists per
//! supported desktop. [`DesktopSink`] stages each raster as a fully written
//! BMP before invoking the platform setter, using one staging file per frame
//! index — the changing path makes settings daemons reload, and since ticks
//! never overlap no setter can observe a partial write.

mod gnome;
mod kde;

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scaler::ScaledRaster;

#[derive(Debug, PartialEq, Error)]
pub enum SinkError {
    #[error("cannot stage frame file: {0}")]
    Stage(String),
    #[error("wallpaper setter failed: {0}")]
    Setter(String),
    #[error("no wallpaper backend for this desktop")]
    Unsupported,
}

/// How a wallpaper change should take effect.
///
/// `persist` asks for the change to be written to the desktop's settings,
/// `broadcast` for it to become visible immediately without a re-login. The
/// Linux backends do both in a single operation, so the hint is advisory
/// there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub persist: bool,
    pub broadcast: bool,
}

impl Scope {
    pub const APPLY_NOW: Self = Self {
        persist: true,
        broadcast: true,
    };
}

/// Platform sink for scaled rasters. A failed apply is non-fatal to the
/// cycle; the driver logs it and carries on.
pub trait WallpaperSink {
    /// # Errors
    /// Fails if the raster cannot be staged to disk or the platform setter
    /// rejects it.
    fn apply(&self, raster: &ScaledRaster, scope: Scope) -> Result<(), SinkError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DesktopKind {
    Gnome,
    Kde,
    Other,
}

impl DesktopKind {
    fn detect() -> Self {
        let Ok(desktop) = env::var("XDG_CURRENT_DESKTOP") else {
            return Self::Other;
        };
        let desktop = desktop.to_ascii_uppercase();
        if desktop.contains("GNOME") {
            Self::Gnome
        } else if desktop.contains("KDE") {
            Self::Kde
        } else {
            Self::Other
        }
    }
}

/// Sink backed by the detected desktop environment.
pub struct DesktopSink {
    kind: DesktopKind,
    staging_dir: PathBuf,
}

impl DesktopSink {
    #[must_use]
    pub fn new(staging_dir: PathBuf) -> Self {
        let kind = DesktopKind::detect();
        if kind == DesktopKind::Other {
            log::warn!("unrecognised desktop, wallpaper changes will be skipped");
        }
        Self { kind, staging_dir }
    }

    fn stage(&self, raster: &ScaledRaster) -> Result<PathBuf, SinkError> {
        let path = self
            .staging_dir
            .join(format!("frame_{}.bmp", raster.frame_index()));
        let rgb = image::DynamicImage::ImageRgba8(raster.image().clone()).to_rgb8();
        rgb.save_with_format(&path, image::ImageFormat::Bmp)
            .map_err(|err| SinkError::Stage(err.to_string()))?;
        Ok(path)
    }
}

impl WallpaperSink for DesktopSink {
    fn apply(&self, raster: &ScaledRaster, scope: Scope) -> Result<(), SinkError> {
        let path = self.stage(raster)?;
        match self.kind {
            DesktopKind::Gnome => gnome::set_wallpaper(&path, scope),
            DesktopKind::Kde => kde::set_wallpaper(&path, scope),
            DesktopKind::Other => Err(SinkError::Unsupported),
        }
    }
}

fn file_uri(path: &Path) -> Result<String, SinkError> {
    let text = path
        .to_str()
        .ok_or_else(|| SinkError::Setter("staging path is not valid UTF-8".to_string()))?;
    Ok(format!("file://{text}"))
}
