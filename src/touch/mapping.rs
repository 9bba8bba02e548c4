//! Raw-to-screen coordinate mapping.
//!
//! The four corner readings of a `CalibrationRecord` are fitted to the
//! screen corners with a least-squares affine transform, which absorbs
//! offset, scale, mirrored axes and swapped axes. Raw coordinates are
//! centred on their mean before fitting to keep `f32` well conditioned.

use embedded_graphics::prelude::{Point, Size};

#[cfg(feature = "embedded")]
use crate::config::TOUCH_POLL_INTERVAL_MS;
use crate::calibration::{CalibrationRecord, Corner};
use crate::error::Error;
use crate::touch::{RawTouch, TouchSampler};

/// Fits whose axes are this close to collinear are rejected.
const MIN_INDEPENDENCE: f32 = 1.0e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Axis {
    a: f32,
    b: f32,
    c: f32,
}

impl Axis {
    fn apply(&self, dx: f32, dy: f32) -> f32 {
        self.a * dx + self.b * dy + self.c
    }
}

/// Affine map from raw controller readings to screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchMapping {
    mean_x: f32,
    mean_y: f32,
    x: Axis,
    y: Axis,
    screen: Size,
}

impl TouchMapping {
    /// Fit the record's corner readings onto `screen`.
    pub fn from_record(record: &CalibrationRecord, screen: Size) -> Result<Self, Error> {
        let n = Corner::ORDER.len() as f32;
        let raw = Corner::ORDER.map(|c| record.corner(c));
        let target = Corner::ORDER.map(|c| c.screen_point(screen));

        let mean_x = raw.iter().map(|p| p.x as f32).sum::<f32>() / n;
        let mean_y = raw.iter().map(|p| p.y as f32).sum::<f32>() / n;
        let mean_sx = target.iter().map(|p| p.x as f32).sum::<f32>() / n;
        let mean_sy = target.iter().map(|p| p.y as f32).sum::<f32>() / n;

        let (mut sxx, mut syy, mut sxy) = (0.0f32, 0.0f32, 0.0f32);
        let (mut sx_sx, mut sy_sx, mut sx_sy, mut sy_sy) = (0.0f32, 0.0f32, 0.0f32, 0.0f32);
        for (r, s) in raw.iter().zip(target.iter()) {
            let dx = r.x as f32 - mean_x;
            let dy = r.y as f32 - mean_y;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
            sx_sx += dx * s.x as f32;
            sy_sx += dy * s.x as f32;
            sx_sy += dx * s.y as f32;
            sy_sy += dy * s.y as f32;
        }

        let det = sxx * syy - sxy * sxy;
        if sxx <= 0.0 || syy <= 0.0 || det <= MIN_INDEPENDENCE * sxx * syy {
            warn!("Touch mapping: degenerate calibration {}", record.coefficients);
            return Err(Error::DegenerateCalibration);
        }

        let solve = |s_dx: f32, s_dy: f32, mean: f32| Axis {
            a: (s_dx * syy - s_dy * sxy) / det,
            b: (s_dy * sxx - s_dx * sxy) / det,
            c: mean,
        };

        Ok(Self {
            mean_x,
            mean_y,
            x: solve(sx_sx, sy_sx, mean_sx),
            y: solve(sx_sy, sy_sy, mean_sy),
            screen,
        })
    }

    /// Screen pixel for a raw reading, clamped to the panel.
    pub fn map(&self, raw: Point) -> Point {
        let dx = raw.x as f32 - self.mean_x;
        let dy = raw.y as f32 - self.mean_y;
        Point::new(
            to_pixel(self.x.apply(dx, dy), self.screen.width),
            to_pixel(self.y.apply(dx, dy), self.screen.height),
        )
    }
}

fn to_pixel(v: f32, extent: u32) -> i32 {
    let max = extent.saturating_sub(1) as f32;
    let v = if v < 0.0 {
        0.0
    } else if v > max {
        max
    } else {
        v
    };
    (v + 0.5) as i32
}

/// `TouchSampler` over a raw controller.
///
/// Until a usable calibration is applied, `touch_point` reports nothing.
pub struct CalibratedPanel<R> {
    raw: R,
    screen: Size,
    mapping: Option<TouchMapping>,
}

impl<R: RawTouch> CalibratedPanel<R> {
    pub fn new(raw: R, screen: Size) -> Self {
        Self {
            raw,
            screen,
            mapping: None,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.mapping.is_some()
    }

    pub fn mapping(&self) -> Option<&TouchMapping> {
        self.mapping.as_ref()
    }

    pub fn inner(&self) -> &R {
        &self.raw
    }

    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.raw
    }
}

impl<R: RawTouch> TouchSampler for CalibratedPanel<R> {
    fn raw_sample(&mut self) -> Option<Point> {
        self.raw.read_raw()
    }

    fn apply_calibration(&mut self, record: &CalibrationRecord) {
        self.mapping = match TouchMapping::from_record(record, self.screen) {
            Ok(mapping) => Some(mapping),
            Err(e) => {
                warn!("Touch: calibration rejected: {:?}", e);
                None
            }
        };
    }

    fn touch_point(&mut self) -> Option<Point> {
        let mapping = self.mapping?;
        self.raw.read_raw().map(|p| mapping.map(p))
    }

    fn idle(&mut self) {
        #[cfg(feature = "embedded")]
        embassy_time::block_for(embassy_time::Duration::from_millis(TOUCH_POLL_INTERVAL_MS));
    }
}
