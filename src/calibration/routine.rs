//! Interactive corner calibration as an explicit state machine.
//!
//! Each corner goes through: prompt → await press → average samples
//! while pressed → await release → next corner. The machine is fed one
//! raw sample (or `None` when the panel is not pressed) per poll, so it
//! can be driven by hardware or by a scripted source in tests.

use embedded_graphics::prelude::{Point, Size};

use super::{CalibrationRecord, COEFFICIENT_COUNT};
use crate::config::CALIBRATION_SAMPLES_PER_POINT;
use crate::touch::TouchSampler;

/// Screen corners in prompt order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Corner {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl Corner {
    pub const ORDER: [Corner; 4] = [
        Corner::TopLeft,
        Corner::BottomLeft,
        Corner::TopRight,
        Corner::BottomRight,
    ];

    /// Position in the prompt order (and in the record).
    pub const fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::BottomLeft => 1,
            Corner::TopRight => 2,
            Corner::BottomRight => 3,
        }
    }

    pub const fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    pub const fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// Corner pixel on a screen of the given size.
    pub fn screen_point(self, screen: Size) -> Point {
        let x = if self.is_left() { 0 } else { screen.width as i32 - 1 };
        let y = if self.is_top() { 0 } else { screen.height as i32 - 1 };
        Point::new(x, y)
    }
}

/// A corner the user is asked to touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationTarget {
    pub corner: Corner,
    /// Screen pixel of the corner.
    pub point: Point,
}

/// Outcome of feeding one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoutineStep {
    /// Nothing new; keep polling.
    Waiting,
    /// Previous corner done; show this one.
    Prompt(CalibrationTarget),
    /// All corners recorded.
    Complete(CalibrationRecord),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    AwaitPress,
    Sampling { sum_x: u32, sum_y: u32, count: u32 },
    AwaitRelease,
    Done,
}

pub struct CalibrationRoutine {
    screen: Size,
    corner: usize,
    phase: Phase,
    coefficients: [u16; COEFFICIENT_COUNT],
}

impl CalibrationRoutine {
    pub fn new(screen: Size) -> Self {
        Self {
            screen,
            corner: 0,
            phase: Phase::AwaitPress,
            coefficients: [0; COEFFICIENT_COUNT],
        }
    }

    /// Corner currently prompted, `None` once complete.
    pub fn target(&self) -> Option<CalibrationTarget> {
        if self.is_complete() {
            return None;
        }
        let corner = Corner::ORDER[self.corner];
        Some(CalibrationTarget {
            corner,
            point: corner.screen_point(self.screen),
        })
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Advance with the current raw reading (`None` = not pressed).
    pub fn feed(&mut self, sample: Option<Point>) -> RoutineStep {
        match (self.phase, sample) {
            (Phase::Done, _) => RoutineStep::Complete(self.record()),
            (Phase::AwaitPress, None) => RoutineStep::Waiting,
            (Phase::AwaitPress, Some(p)) => {
                self.phase = Phase::Sampling {
                    sum_x: clamp_raw(p.x),
                    sum_y: clamp_raw(p.y),
                    count: 1,
                };
                self.finish_if_sampled()
            }
            (Phase::Sampling { sum_x, sum_y, count }, Some(p)) => {
                self.phase = Phase::Sampling {
                    sum_x: sum_x + clamp_raw(p.x),
                    sum_y: sum_y + clamp_raw(p.y),
                    count: count + 1,
                };
                self.finish_if_sampled()
            }
            // Released early: keep what was collected.
            (Phase::Sampling { sum_x, sum_y, count }, None) => {
                self.store(sum_x / count, sum_y / count);
                self.advance()
            }
            (Phase::AwaitRelease, Some(_)) => RoutineStep::Waiting,
            (Phase::AwaitRelease, None) => self.advance(),
        }
    }

    fn finish_if_sampled(&mut self) -> RoutineStep {
        if let Phase::Sampling { sum_x, sum_y, count } = self.phase {
            if count >= CALIBRATION_SAMPLES_PER_POINT {
                self.store(sum_x / count, sum_y / count);
                self.phase = Phase::AwaitRelease;
            }
        }
        RoutineStep::Waiting
    }

    fn store(&mut self, x: u32, y: u32) {
        let i = self.corner * 2;
        self.coefficients[i] = x as u16;
        self.coefficients[i + 1] = y as u16;
    }

    fn advance(&mut self) -> RoutineStep {
        self.corner += 1;
        if self.corner >= Corner::ORDER.len() {
            self.phase = Phase::Done;
            return RoutineStep::Complete(self.record());
        }
        self.phase = Phase::AwaitPress;
        match self.target() {
            Some(target) => RoutineStep::Prompt(target),
            None => RoutineStep::Waiting,
        }
    }

    fn record(&self) -> CalibrationRecord {
        CalibrationRecord::new(self.coefficients)
    }
}

fn clamp_raw(v: i32) -> u32 {
    v.clamp(0, u16::MAX as i32) as u32
}

/// Run the routine to completion against `touch`.
///
/// Blocks until every corner has been touched and released; there is no
/// timeout and no cancellation.
pub fn acquire<T, P>(touch: &mut T, screen: Size, mut prompt: P) -> CalibrationRecord
where
    T: TouchSampler + ?Sized,
    P: FnMut(CalibrationTarget),
{
    let mut routine = CalibrationRoutine::new(screen);
    if let Some(target) = routine.target() {
        prompt(target);
    }

    loop {
        match routine.feed(touch.raw_sample()) {
            RoutineStep::Waiting => touch.idle(),
            RoutineStep::Prompt(target) => {
                debug!("Calibration: next corner {:?}", target.corner);
                prompt(target);
            }
            RoutineStep::Complete(record) => return record,
        }
    }
}
