use embedded_graphics::prelude::Point;

use crate::ui::buttons::{ButtonDescriptor, ButtonId};

/// First button, in iteration order, whose hit area contains `point`.
pub fn hit_test<'a, I>(point: Point, buttons: I) -> Option<ButtonId>
where
    I: IntoIterator<Item = &'a ButtonDescriptor>,
{
    buttons
        .into_iter()
        .find(|b| b.contains(point))
        .map(ButtonDescriptor::id)
}
