//! Primary display geometry.
//!
//! The target is a read-only snapshot, re-queried on every scaling pass so
//! resolution or DPI changes take effect without a restart.

use display_info::DisplayInfo;
use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum DisplayError {
    #[error("cannot query displays: {0}")]
    Query(String),
    #[error("no display found")]
    NoDisplay,
}

/// Bounds of the primary display, optionally DPI-adjusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTarget {
    pub width: u32,
    pub height: u32,
    pub dpi_scale: f32,
}

/// Source of fresh [`DisplayTarget`] snapshots.
pub trait DisplaySource {
    /// # Errors
    /// Fails if the display list cannot be queried or is empty.
    fn current(&self) -> Result<DisplayTarget, DisplayError>;
}

/// Queries the live display list. Prefers the primary display, falling back
/// to the first one reported.
pub struct LiveDisplay {
    dpi_aware: bool,
}

impl LiveDisplay {
    #[must_use]
    pub fn new(dpi_aware: bool) -> Self {
        Self { dpi_aware }
    }
}

impl DisplaySource for LiveDisplay {
    fn current(&self) -> Result<DisplayTarget, DisplayError> {
        let displays = DisplayInfo::all().map_err(|err| DisplayError::Query(err.to_string()))?;
        let primary = displays
            .iter()
            .find(|display| display.is_primary)
            .or_else(|| displays.first())
            .ok_or(DisplayError::NoDisplay)?;
        let dpi_scale = if self.dpi_aware {
            primary.scale_factor
        } else {
            1.0
        };
        Ok(scaled_target(primary.width, primary.height, dpi_scale))
    }
}

fn scaled_target(width: u32, height: u32, dpi_scale: f32) -> DisplayTarget {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = |dim: u32| ((dim as f32 * dpi_scale).round() as u32).max(1);
    DisplayTarget {
        width: scaled(width),
        height: scaled(height),
        dpi_scale,
    }
}
