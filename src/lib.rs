//! Touch front end for a Reversi board on a 240×320 resistive TFT.
//!
//! Host-testable library: nothing here touches a specific MCU. The board
//! support code provides a raw touch controller, a draw target and a
//! NOR flash partition; this crate handles the rest.
//!
//! Startup:
//!   1. `CalibrationStore::ensure_calibration` loads or acquires the touch
//!      calibration and applies it to the panel.
//!   2. `ControlSurface::poll` runs in the control loop, turning presses
//!      into `Command`s for the game engine.
//!   3. `ui::display::draw_surface` redraws after state changes.
//!
//! Usage: `cargo test` on the host; enable the `embedded` feature for
//! on-target builds (defmt logging, embassy-time polling delays).

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod calibration;
pub mod config;
pub mod error;
pub mod storage;
pub mod touch;
pub mod ui;

pub use calibration::{Calibration, CalibrationRecord, CalibrationSource, CalibrationStore};
pub use error::{Error, StorageError};
pub use storage::{BlobStore, FlashBlobStore, MemoryBlobStore};
pub use touch::{CalibratedPanel, RawTouch, TouchSampler};
pub use ui::{Command, ControlSurface};

// ═══════════════════════════════════════════════════════════════════════════
// Startup scenarios
// ═══════════════════════════════════════════════════════════════════════════
