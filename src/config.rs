//! Application-wide constants and compile-time configuration.
//!
//! Screen geometry, button placement, calibration and storage parameters
//! live here so they can be tuned in one place.

// Display

/// Panel width in pixels (portrait orientation).
pub const SCREEN_WIDTH: u32 = 240;

/// Panel height in pixels (portrait orientation).
pub const SCREEN_HEIGHT: u32 = 320;

// Calibration

/// Name of the persisted calibration blob.
/// Change it to force a fresh calibration file on an existing device.
pub const CALIBRATION_FILE: &str = "/touch_cal_v1";

/// Run the calibration routine on every boot, replacing the stored blob.
/// Set this after changing the screen rotation, then set it back.
pub const FORCE_RECALIBRATION: bool = false;

/// Size (px) of the corner marker drawn while prompting for a touch.
pub const CALIBRATION_MARKER_SIZE: u32 = 15;

/// Raw samples averaged per reference point while the finger is down.
pub const CALIBRATION_SAMPLES_PER_POINT: u32 = 8;

/// Delay between raw touch polls while the calibration routine runs (ms).
pub const TOUCH_POLL_INTERVAL_MS: u64 = 10;

// Keypad (8×8 board)
//
// Positions are button centres, as laid out on the device; the registry
// converts them to top-left origins.

pub const BOARD_SIZE: usize = 8;

pub const NUMBER_OF_KEYS: usize = BOARD_SIZE * BOARD_SIZE;

pub const KEY_X: i32 = 15;
pub const KEY_Y: i32 = 15;
pub const KEY_W: u32 = 25;
pub const KEY_H: u32 = 25;
pub const KEY_SPACING_X: u32 = 5;
pub const KEY_SPACING_Y: u32 = 5;

/// Pixels of the gap before a board cell that belong to its touch area.
/// The rest of the gap goes to the cell after it, so touch areas tile
/// the board with no shared pixels.
pub const KEY_HIT_LEAD_X: u32 = KEY_SPACING_X / 2;
pub const KEY_HIT_LEAD_Y: u32 = KEY_SPACING_Y / 2;

// Settings page selectors

pub const GAME_MODE_Y: i32 = 140;
pub const GAME_MODE_X: [i32; 2] = [60, 180];
pub const GAME_MODE_W: u32 = 110;
pub const GAME_MODE_H: u32 = 40;

pub const DIFFICULTY_Y: i32 = 230;
pub const DIFFICULTY_X: [i32; 3] = [40, 120, 200];
pub const DIFFICULTY_W: u32 = 75;
pub const DIFFICULTY_H: u32 = 40;

// Blob storage

/// Flash offset where the blob partition starts (must be erase-aligned).
pub const STORAGE_FLASH_START: u32 = 0x3F_0000;

/// Bytes reserved for the blob partition (two 4 KB sectors).
pub const STORAGE_FLASH_SIZE: u32 = 2 * 4096;

/// Largest blob the stores accept.
pub const MAX_BLOB_SIZE: usize = 64;

/// Number of named blobs the in-memory store can hold.
pub const MEMORY_STORE_SLOTS: usize = 4;
