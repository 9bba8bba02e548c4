//! Unified error type for reversi-touch.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for on-target logging.

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Blob storage failed; see [`StorageError`].
    Storage(StorageError),

    /// A raw identity does not name any button.
    UnknownButton(u8),

    /// The calibration samples do not span the screen (singular transform).
    DegenerateCalibration,
}

/// Faults reported by a blob store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No blob with the requested name.
    NotFound,

    /// Underlying medium read/write/erase failed.
    Io,

    /// No room left for another blob.
    Full,

    /// Blob exceeds the store's per-item limit.
    TooLarge,
}

// Convenience conversions

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}
