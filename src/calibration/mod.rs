//! Touch calibration lifecycle.
//!
//! On boot the stored calibration blob is validated and loaded. When it
//! is missing, truncated or unreadable, or when recalibration is forced,
//! the interactive corner routine runs and the fresh record is written
//! back. Storage faults never stop the device: the record is always
//! applied to the touch panel, persisted or not.
//!
//! Blob layout (16 bytes, little-endian `u16`s):
//! ```text
//! [x_tl, y_tl, x_bl, y_bl, x_tr, y_tr, x_br, y_br]
//! ```
//! raw controller readings for the four screen corners, in prompt order.

mod routine;

#[cfg(test)]
mod tests;

pub use routine::{acquire, CalibrationRoutine, CalibrationTarget, Corner, RoutineStep};

use embedded_graphics::prelude::{Point, Size};

use crate::config::{CALIBRATION_FILE, FORCE_RECALIBRATION, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::storage::BlobStore;
use crate::touch::TouchSampler;

/// Number of calibration coefficients.
pub const COEFFICIENT_COUNT: usize = 8;

/// Persisted size of a calibration record in bytes.
pub const RECORD_SIZE: usize = COEFFICIENT_COUNT * 2;

/// Raw corner readings that map controller samples to screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRecord {
    pub coefficients: [u16; COEFFICIENT_COUNT],
}

impl CalibrationRecord {
    /// Record from raw coefficients in persisted order.
    pub const fn new(coefficients: [u16; COEFFICIENT_COUNT]) -> Self {
        Self { coefficients }
    }

    /// Parse a persisted blob. Anything but exactly `RECORD_SIZE` bytes
    /// is rejected.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() != RECORD_SIZE {
            return None;
        }
        let mut coefficients = [0u16; COEFFICIENT_COUNT];
        for (c, chunk) in coefficients.iter_mut().zip(data.chunks_exact(2)) {
            *c = u16::from_le_bytes([chunk[0], chunk[1]]);
        }
        Some(Self { coefficients })
    }

    /// Serialise for storage.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        for (chunk, c) in buf.chunks_exact_mut(2).zip(self.coefficients.iter()) {
            chunk.copy_from_slice(&c.to_le_bytes());
        }
        buf
    }

    /// Raw reading recorded for one corner.
    pub fn corner(&self, corner: Corner) -> Point {
        let i = corner.index() * 2;
        Point::new(
            self.coefficients[i] as i32,
            self.coefficients[i + 1] as i32,
        )
    }
}

/// Where the active calibration came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationSource {
    /// Loaded from the stored blob; the routine did not run.
    Stored,
    /// Acquired interactively this boot.
    Acquired {
        /// `false` when writing the blob failed; the next boot will
        /// calibrate again.
        persisted: bool,
    },
}

/// Result of [`CalibrationStore::ensure_calibration`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub record: CalibrationRecord,
    pub source: CalibrationSource,
}

/// Loads, acquires and persists the calibration record.
pub struct CalibrationStore<S> {
    storage: S,
    force_recalibration: bool,
    screen: Size,
}

impl<S: BlobStore> CalibrationStore<S> {
    /// Store using the build-time `FORCE_RECALIBRATION` flag.
    pub fn new(storage: S) -> Self {
        Self::with_force(storage, FORCE_RECALIBRATION)
    }

    /// Store with an explicit force-recalibration setting.
    pub fn with_force(storage: S, force_recalibration: bool) -> Self {
        Self {
            storage,
            force_recalibration,
            screen: Size::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        }
    }

    /// Screen size the corner targets are placed on.
    pub fn with_screen(mut self, screen: Size) -> Self {
        self.screen = screen;
        self
    }

    /// Whether the next `ensure_calibration` ignores the stored record.
    pub fn is_forced(&self) -> bool {
        self.force_recalibration
    }

    /// Underlying blob store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Underlying blob store, mutably.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Give back the blob store.
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Read and validate the stored record.
    ///
    /// Returns `None` when the blob is absent, unreadable or not exactly
    /// `RECORD_SIZE` bytes long.
    pub fn load(&mut self) -> Option<CalibrationRecord> {
        if !self.storage.exists(CALIBRATION_FILE) {
            info!("Calibration: no stored record");
            return None;
        }

        // One spare byte so an oversized blob shows up as a wrong length.
        let mut buf = [0u8; RECORD_SIZE + 1];
        match self.storage.read(CALIBRATION_FILE, &mut buf) {
            Ok(n) => {
                let record = CalibrationRecord::from_bytes(&buf[..n]);
                if record.is_none() {
                    warn!("Calibration: stored record has {} bytes, expected {}", n, RECORD_SIZE);
                }
                record
            }
            Err(e) => {
                warn!("Calibration: read failed: {:?}", e);
                None
            }
        }
    }

    /// Write the record. Returns `false` on any storage fault.
    pub fn persist(&mut self, record: &CalibrationRecord) -> bool {
        match self.storage.write(CALIBRATION_FILE, &record.to_bytes()) {
            Ok(RECORD_SIZE) => {
                info!("Calibration: record saved");
                true
            }
            Ok(n) => {
                error!("Calibration: short write ({} of {} bytes)", n, RECORD_SIZE);
                false
            }
            Err(e) => {
                error!("Calibration: write failed: {:?}", e);
                false
            }
        }
    }

    /// Make a calibration available and apply it to `touch`.
    ///
    /// Blocks inside the interactive routine when no usable record is
    /// stored or recalibration is forced. `prompt` is called for every
    /// corner the user must touch.
    pub fn ensure_calibration<T, P>(&mut self, touch: &mut T, prompt: P) -> Calibration
    where
        T: TouchSampler + ?Sized,
        P: FnMut(CalibrationTarget),
    {
        if self.force_recalibration {
            if self.storage.exists(CALIBRATION_FILE) && !self.storage.remove(CALIBRATION_FILE) {
                warn!("Calibration: could not remove stale record");
            }
        } else if let Some(record) = self.load() {
            info!("Calibration: using stored record {}", record.coefficients);
            touch.apply_calibration(&record);
            return Calibration {
                record,
                source: CalibrationSource::Stored,
            };
        }

        info!("Calibration: touch the corners as indicated");
        let record = acquire(touch, self.screen, prompt);
        info!("Calibration: acquired {}", record.coefficients);

        let persisted = self.persist(&record);
        touch.apply_calibration(&record);
        Calibration {
            record,
            source: CalibrationSource::Acquired { persisted },
        }
    }
}
