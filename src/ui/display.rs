//! Rendering of the control surface with `embedded-graphics`.
//!
//! Generic over any `Rgb565` draw target so the panel driver stays
//! outside this crate.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, PrimitiveStyle, PrimitiveStyleBuilder, RoundedRectangle, Triangle,
};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};

use crate::calibration::CalibrationTarget;
use crate::config::CALIBRATION_MARKER_SIZE;
use crate::ui::buttons::{ButtonDescriptor, ButtonKind, Player, VisualState};
use crate::ui::ControlSurface;

/// Dark grey board background (TFT_DARKGREY).
pub const BACKGROUND: Rgb565 = Rgb565::new(15, 31, 15);

const OUTLINE: Rgb565 = Rgb565::WHITE;
const SELECTOR_FILL: Rgb565 = Rgb565::BLUE;
const SELECTED_FILL: Rgb565 = Rgb565::GREEN;
const HIGHLIGHT_FILL: Rgb565 = Rgb565::YELLOW;
const MARKER: Rgb565 = Rgb565::MAGENTA;
const WARNING: Rgb565 = Rgb565::RED;
const DONE: Rgb565 = Rgb565::GREEN;

/// Vertical distance between stacked calibration messages.
const LINE_STEP: i32 = 24;

fn text_style(color: Rgb565) -> MonoTextStyle<'static, Rgb565> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(color)
        .build()
}

fn centered() -> TextStyle {
    TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build()
}

/// Fill colour for a button in its current state.
pub fn fill_color(button: &ButtonDescriptor) -> Rgb565 {
    match (button.id().kind(), button.state()) {
        (_, VisualState::Selected) => SELECTED_FILL,
        (_, VisualState::Highlighted) => HIGHLIGHT_FILL,
        (ButtonKind::Cell { .. }, _) => BACKGROUND,
        (_, _) => SELECTOR_FILL,
    }
}

/// Draw one button: rounded box, state fill, disc for occupied cells,
/// centred label.
pub fn draw_button<D>(display: &mut D, button: &ButtonDescriptor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let bounds = button.bounds();
    let radius = bounds.size.width.min(bounds.size.height) / 4;
    let style = PrimitiveStyleBuilder::new()
        .stroke_color(OUTLINE)
        .stroke_width(1)
        .fill_color(fill_color(button))
        .build();
    RoundedRectangle::with_equal_corners(bounds, Size::new(radius, radius))
        .into_styled(style)
        .draw(display)?;

    if let VisualState::Occupied(player) = button.state() {
        let color = match player {
            Player::Black => Rgb565::BLACK,
            Player::White => Rgb565::WHITE,
        };
        let diameter = bounds.size.width.min(bounds.size.height).saturating_sub(6);
        Circle::with_center(bounds.center(), diameter)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(display)?;
    }

    if !button.label().is_empty() {
        Text::with_text_style(
            button.label(),
            bounds.center(),
            text_style(Rgb565::WHITE),
            centered(),
        )
        .draw(display)?;
    }
    Ok(())
}

/// Clear the screen and draw every button active in the current mode.
pub fn draw_surface<D>(display: &mut D, surface: &ControlSurface) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BACKGROUND)?;
    for button in surface.active_set() {
        draw_button(display, button)?;
    }
    Ok(())
}

/// Corner marker for the calibration routine: a right triangle whose
/// right angle sits on the target pixel, plus the instructions. A forced
/// recalibration also shows how to turn it off.
pub fn draw_calibration_target<D>(
    display: &mut D,
    target: CalibrationTarget,
    forced: bool,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let size = CALIBRATION_MARKER_SIZE as i32 - 1;
    let dx = if target.corner.is_left() { size } else { -size };
    let dy = if target.corner.is_top() { size } else { -size };
    let p = target.point;

    display.clear(Rgb565::BLACK)?;
    Triangle::new(p, p + Point::new(dx, 0), p + Point::new(0, dy))
        .into_styled(PrimitiveStyle::with_fill(MARKER))
        .draw(display)?;

    let center = display.bounding_box().center();
    Text::with_text_style(
        "Touch corners as indicated",
        center,
        text_style(Rgb565::WHITE),
        centered(),
    )
    .draw(display)?;

    if forced {
        Text::with_text_style(
            "Set FORCE_RECALIBRATION to false\nto stop this running again!",
            center + Point::new(0, LINE_STEP),
            text_style(WARNING),
            centered(),
        )
        .draw(display)?;
    }
    Ok(())
}

/// Final calibration screen.
pub fn draw_calibration_complete<D>(display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(Rgb565::BLACK)?;
    Text::with_text_style(
        "Calibration complete!",
        display.bounding_box().center(),
        text_style(DONE),
        centered(),
    )
    .draw(display)?;
    Ok(())
}
