//! Drives the fixed-period advance-scale-apply cycle.
//!
//! A tick's failure is logged and swallowed; the animation's value is
//! continuity, so only `stop()` or cancellation ends the schedule. Ticks run
//! strictly one after another, which also serializes access to the store's
//! active-frame cursor.

use std::time::Duration;
use thiserror::Error;

use crate::cancel::CancelToken;
use crate::display::{DisplayError, DisplaySource};
use crate::scaler::{self, ScaleError};
use crate::sink::{Scope, SinkError, WallpaperSink};
use crate::store::{FrameStore, StoreError};

/// One frame every 100 ms, 10 fps.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq, Error)]
pub enum DriverError {
    #[error("driver has already been started")]
    InvalidState,
}

/// A single tick's failure. Never escapes [`CycleDriver::run`].
#[derive(Debug, PartialEq, Error)]
pub enum TickError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error(transparent)]
    Scale(#[from] ScaleError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Stopped,
}

/// Cycle bookkeeping, owned exclusively by the driver.
struct CycleState {
    phase: Phase,
    frame_index: usize,
}

pub struct CycleDriver<S: WallpaperSink, D: DisplaySource> {
    store: FrameStore,
    sink: S,
    display: D,
    state: CycleState,
    cancel: CancelToken,
}

impl<S: WallpaperSink, D: DisplaySource> CycleDriver<S, D> {
    #[must_use]
    pub fn new(store: FrameStore, sink: S, display: D, cancel: CancelToken) -> Self {
        Self {
            store,
            sink,
            display,
            state: CycleState {
                phase: Phase::Idle,
                frame_index: 0,
            },
            cancel,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[must_use]
    pub fn current_frame_index(&self) -> usize {
        self.state.frame_index
    }

    /// Moves the driver from `Idle` to `Running`.
    ///
    /// # Errors
    /// [`DriverError::InvalidState`] if the driver is not `Idle`.
    pub fn start(&mut self) -> Result<(), DriverError> {
        match self.state.phase {
            Phase::Idle => {
                self.state.phase = Phase::Running;
                Ok(())
            }
            Phase::Running | Phase::Stopped => Err(DriverError::InvalidState),
        }
    }

    /// Executes one advance-scale-apply pass: selects the current frame,
    /// advances the index modulo the frame count, scales the frame against a
    /// fresh display snapshot and hands the raster to the sink.
    ///
    /// # Errors
    /// Any step's failure aborts this tick only. The index has already
    /// advanced by then, so the next tick moves on to the next frame.
    pub fn tick(&mut self) -> Result<(), TickError> {
        let index = self.state.frame_index;
        let count = self.store.frame_count();
        let frame = self.store.select_frame(index)?;
        self.state.frame_index = (index + 1) % count;
        let target = self.display.current()?;
        let raster = scaler::scale_to_fit(frame, &target, index)?;
        self.sink.apply(&raster, Scope::APPLY_NOW)?;
        Ok(())
    }

    /// Runs the periodic schedule until `stop()` or cancellation.
    ///
    /// The first tick fires immediately; afterwards the fixed period elapses
    /// between ticks, raced against the cancellation token so shutdown is
    /// prompt.
    pub async fn run(&mut self) {
        while self.state.phase == Phase::Running && !self.cancel.is_triggered() {
            if let Err(err) = self.tick() {
                log::warn!("tick failed: {err}, skipping");
            }
            smol::future::race(
                async {
                    smol::Timer::after(TICK_INTERVAL).await;
                },
                self.cancel.wait(),
            )
            .await;
        }
        self.stop();
    }

    /// Ends the schedule and releases the decoded image. Idempotent; valid
    /// from `Idle` as well.
    pub fn stop(&mut self) {
        if self.state.phase == Phase::Stopped {
            return;
        }
        self.state.phase = Phase::Stopped;
        self.store.close();
        log::info!("wallpaper cycle stopped");
    }
}
