//! Edge-triggered touch dispatch.
//!
//! A press is reported once, on the released → pressed transition, and
//! resolved against the buttons active in the current UI mode. Holding
//! the finger down produces no further events until it is lifted and
//! pressed again.

use embedded_graphics::prelude::Point;

use crate::touch::TouchSampler;
use crate::ui::buttons::{ButtonId, ButtonRegistry};
use crate::ui::input_logic::hit_test;
use crate::ui::UiMode;

/// Result of one poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchEvent {
    /// Button under a new press, if any.
    pub button: Option<ButtonId>,
    /// A new press started this poll (possibly outside every button).
    pub touched: bool,
}

impl TouchEvent {
    pub const NONE: TouchEvent = TouchEvent {
        button: None,
        touched: false,
    };

    pub fn is_none(&self) -> bool {
        !self.touched
    }
}

/// Tracks press state and the last resolved button.
#[derive(Clone, Copy, Debug, Default)]
pub struct TouchDispatcher {
    pressed: bool,
    pending: Option<ButtonId>,
}

impl TouchDispatcher {
    pub const fn new() -> Self {
        Self {
            pressed: false,
            pending: None,
        }
    }

    /// Sample `touch` once and dispatch the result.
    pub fn poll<T: TouchSampler + ?Sized>(
        &mut self,
        touch: &mut T,
        registry: &ButtonRegistry,
        mode: UiMode,
    ) -> TouchEvent {
        let point = touch.touch_point();
        self.update(point, registry, mode)
    }

    /// Dispatch an already sampled point (`None` = not pressed).
    pub fn update(
        &mut self,
        point: Option<Point>,
        registry: &ButtonRegistry,
        mode: UiMode,
    ) -> TouchEvent {
        let Some(point) = point else {
            self.pressed = false;
            return TouchEvent::NONE;
        };

        if self.pressed {
            return TouchEvent::NONE;
        }
        self.pressed = true;

        let button = hit_test(point, registry.active_set(mode));
        match button {
            Some(id) => {
                debug!("Touch: ({}, {}) -> button {}", point.x, point.y, id.raw());
                self.pending = Some(id);
            }
            None => debug!("Touch: ({}, {}) missed", point.x, point.y),
        }
        TouchEvent {
            button,
            touched: true,
        }
    }

    /// Take the last resolved button, leaving nothing outstanding.
    pub fn take_pending(&mut self) -> Option<ButtonId> {
        self.pending.take()
    }

    /// Whether the panel was pressed at the last poll.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}
