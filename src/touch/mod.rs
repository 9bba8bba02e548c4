//! Touch input: sampling service contract, coordinate mapping and
//! edge-triggered dispatch onto the button registry.
//!
//! ## Components
//!
//! - **TouchSampler**: the panel as seen by the rest of the crate
//! - **CalibratedPanel**: `TouchSampler` over a raw controller + mapping
//! - **TouchDispatcher**: press-edge detection and hit-testing

pub mod dispatch;
pub mod mapping;

pub use dispatch::{TouchDispatcher, TouchEvent};
pub use mapping::{CalibratedPanel, TouchMapping};

use embedded_graphics::prelude::Point;

use crate::calibration::CalibrationRecord;

/// Touch sampling / coordinate mapping service.
///
/// At most one contact point is reported; multi-touch controllers are
/// expected to report a single point.
pub trait TouchSampler {
    /// Raw controller reading while the panel is pressed.
    fn raw_sample(&mut self) -> Option<Point>;

    /// Install calibration coefficients for `touch_point`.
    fn apply_calibration(&mut self, record: &CalibrationRecord);

    /// Calibrated screen position while the panel is pressed.
    fn touch_point(&mut self) -> Option<Point>;

    /// Called between polls of a blocking loop (calibration).
    fn idle(&mut self) {}
}

impl<T: TouchSampler + ?Sized> TouchSampler for &mut T {
    fn raw_sample(&mut self) -> Option<Point> {
        (**self).raw_sample()
    }

    fn apply_calibration(&mut self, record: &CalibrationRecord) {
        (**self).apply_calibration(record)
    }

    fn touch_point(&mut self) -> Option<Point> {
        (**self).touch_point()
    }

    fn idle(&mut self) {
        (**self).idle()
    }
}

/// Uncalibrated touch controller (e.g. a resistive ADC).
pub trait RawTouch {
    /// Current raw reading, `None` when not pressed.
    fn read_raw(&mut self) -> Option<Point>;
}
