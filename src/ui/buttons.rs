//! Touch button registry.
//!
//! Every button is allocated once, in a fixed array indexed by its
//! identity:
//!
//! ```text
//!   0..=63   board cells, row-major (id = row * 8 + col)
//!  64..=65   game mode selectors (Human-AI, AI - AI)
//!  66..=68   difficulty selectors (Easy, Medium, Hard)
//! ```
//!
//! Geometry never changes after construction; only the visual state is
//! mutable. The active subset for a UI mode is a contiguous slice of the
//! array, already in hit-test order.

use core::ops::Range;

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::{ContainsPoint, Rectangle};

use crate::config::{
    BOARD_SIZE, DIFFICULTY_H, DIFFICULTY_W, DIFFICULTY_X, DIFFICULTY_Y, GAME_MODE_H, GAME_MODE_W,
    GAME_MODE_X, GAME_MODE_Y, KEY_H, KEY_HIT_LEAD_X, KEY_HIT_LEAD_Y, KEY_SPACING_X, KEY_SPACING_Y,
    KEY_W, KEY_X, KEY_Y, NUMBER_OF_KEYS,
};
use crate::error::Error;
use crate::ui::mode::{Difficulty, GameMode};
use crate::ui::UiMode;

const CELL_RANGE: Range<usize> = 0..NUMBER_OF_KEYS;
const MODE_RANGE: Range<usize> = NUMBER_OF_KEYS..NUMBER_OF_KEYS + 2;
const DIFFICULTY_RANGE: Range<usize> = MODE_RANGE.end..MODE_RANGE.end + 3;
const SELECTOR_RANGE: Range<usize> = MODE_RANGE.start..DIFFICULTY_RANGE.end;

/// Stable identity of a touch button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonId(u8);

impl ButtonId {
    /// Total number of buttons.
    pub const COUNT: usize = DIFFICULTY_RANGE.end;

    /// Board cell at `(row, col)`.
    pub const fn cell(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self((row * BOARD_SIZE + col) as u8))
        } else {
            None
        }
    }

    /// Selector for a game mode.
    pub const fn game_mode(mode: GameMode) -> Self {
        Self((MODE_RANGE.start + mode.index()) as u8)
    }

    /// Selector for a difficulty.
    pub const fn difficulty(difficulty: Difficulty) -> Self {
        Self((DIFFICULTY_RANGE.start + difficulty.index()) as u8)
    }

    /// Raw identity, 0..`COUNT`.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Position in the registry array.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// What this button stands for.
    pub fn kind(self) -> ButtonKind {
        let i = self.index();
        if CELL_RANGE.contains(&i) {
            ButtonKind::Cell {
                row: i / BOARD_SIZE,
                col: i % BOARD_SIZE,
            }
        } else if MODE_RANGE.contains(&i) {
            ButtonKind::GameMode(GameMode::ALL[i - MODE_RANGE.start])
        } else {
            ButtonKind::Difficulty(Difficulty::ALL[i - DIFFICULTY_RANGE.start])
        }
    }
}

impl TryFrom<u8> for ButtonId {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        if (raw as usize) < Self::COUNT {
            Ok(Self(raw))
        } else {
            Err(Error::UnknownButton(raw))
        }
    }
}

/// What a button stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonKind {
    Cell { row: usize, col: usize },
    GameMode(GameMode),
    Difficulty(Difficulty),
}

/// Disc colour on a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Player {
    Black,
    White,
}

/// Semantic visual state; the presenter picks the colours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VisualState {
    /// Empty cell / unselected selector.
    #[default]
    Neutral,
    Occupied(Player),
    /// e.g. a legal move or the last move played.
    Highlighted,
    /// Chosen selector.
    Selected,
}

/// One addressable touch target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonDescriptor {
    id: ButtonId,
    bounds: Rectangle,
    hit_area: Rectangle,
    state: VisualState,
    label: &'static str,
}

impl ButtonDescriptor {
    fn centered(
        id: ButtonId,
        center_x: i32,
        center_y: i32,
        width: u32,
        height: u32,
        label: &'static str,
    ) -> Self {
        // Top-left from centre, rounding half widths down.
        let top_left = Point::new(center_x - (width / 2) as i32, center_y - (height / 2) as i32);
        let bounds = Rectangle::new(top_left, Size::new(width, height));
        Self {
            id,
            bounds,
            hit_area: bounds,
            state: VisualState::Neutral,
            label,
        }
    }

    /// Stable identity.
    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// Drawn rectangle.
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// Touch-sensitive rectangle. Selectors use their bounds; board cells
    /// also own part of the surrounding gap.
    pub fn hit_area(&self) -> Rectangle {
        self.hit_area
    }

    /// Whether a touch at `point` lands on this button.
    pub fn contains(&self, point: Point) -> bool {
        self.hit_area().contains(point)
    }

    /// Current visual state.
    pub fn state(&self) -> VisualState {
        self.state
    }

    /// Static label, empty for board cells.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

/// All buttons of the device, allocated once.
#[derive(Clone, Debug)]
pub struct ButtonRegistry {
    buttons: [ButtonDescriptor; ButtonId::COUNT],
}

impl ButtonRegistry {
    /// Build every button with neutral state.
    pub fn new() -> Self {
        let grid = Self::build_grid();
        let modes = Self::build_mode_selectors();
        let difficulties = Self::build_difficulty_selectors();

        let buttons = core::array::from_fn(|i| {
            if CELL_RANGE.contains(&i) {
                grid[i]
            } else if MODE_RANGE.contains(&i) {
                modes[i - MODE_RANGE.start]
            } else {
                difficulties[i - DIFFICULTY_RANGE.start]
            }
        });
        Self { buttons }
    }

    /// The 8×8 board, row-major. Cell `(row, col)` sits at
    /// `(X0 + col·(W+Sx), Y0 + row·(H+Sy))`.
    pub fn build_grid() -> [ButtonDescriptor; NUMBER_OF_KEYS] {
        core::array::from_fn(|i| {
            let (row, col) = (i / BOARD_SIZE, i % BOARD_SIZE);
            let mut cell = ButtonDescriptor::centered(
                ButtonId(i as u8),
                KEY_X + col as i32 * (KEY_W + KEY_SPACING_X) as i32,
                KEY_Y + row as i32 * (KEY_H + KEY_SPACING_Y) as i32,
                KEY_W,
                KEY_H,
                "",
            );
            cell.hit_area = Rectangle::new(
                cell.bounds.top_left - Point::new(KEY_HIT_LEAD_X as i32, KEY_HIT_LEAD_Y as i32),
                Size::new(KEY_W + KEY_SPACING_X, KEY_H + KEY_SPACING_Y),
            );
            cell
        })
    }

    /// The two game mode selectors, in `GameMode::ALL` order.
    pub fn build_mode_selectors() -> [ButtonDescriptor; 2] {
        GameMode::ALL.map(|mode| {
            ButtonDescriptor::centered(
                ButtonId::game_mode(mode),
                GAME_MODE_X[mode.index()],
                GAME_MODE_Y,
                GAME_MODE_W,
                GAME_MODE_H,
                mode.label(),
            )
        })
    }

    /// The three difficulty selectors, in `Difficulty::ALL` order.
    pub fn build_difficulty_selectors() -> [ButtonDescriptor; 3] {
        Difficulty::ALL.map(|difficulty| {
            ButtonDescriptor::centered(
                ButtonId::difficulty(difficulty),
                DIFFICULTY_X[difficulty.index()],
                DIFFICULTY_Y,
                DIFFICULTY_W,
                DIFFICULTY_H,
                difficulty.label(),
            )
        })
    }

    /// Descriptor for `id`.
    pub fn get(&self, id: ButtonId) -> &ButtonDescriptor {
        &self.buttons[id.index()]
    }

    /// Visual state of `id`.
    pub fn state(&self, id: ButtonId) -> VisualState {
        self.buttons[id.index()].state
    }

    /// Change a button's visual state. Geometry and identity are untouched.
    pub fn set_state(&mut self, id: ButtonId, state: VisualState) {
        self.buttons[id.index()].state = state;
    }

    /// Buttons eligible for hit-testing in `mode`, in hit-test order.
    pub fn active_set(&self, mode: UiMode) -> &[ButtonDescriptor] {
        match mode {
            UiMode::Settings => &self.buttons[SELECTOR_RANGE],
            UiMode::Play => &self.buttons[CELL_RANGE],
        }
    }

    /// The 64 board cells, row-major.
    pub fn cells(&self) -> &[ButtonDescriptor] {
        &self.buttons[CELL_RANGE]
    }

    /// Every button, indexed by identity.
    pub fn all(&self) -> &[ButtonDescriptor] {
        &self.buttons
    }

    /// Every board cell back to `Neutral`.
    pub fn reset_grid(&mut self) {
        for cell in &mut self.buttons[CELL_RANGE] {
            cell.state = VisualState::Neutral;
        }
    }

    /// Every selector back to `Neutral`.
    pub fn reset_selectors(&mut self) {
        for selector in &mut self.buttons[SELECTOR_RANGE] {
            selector.state = VisualState::Neutral;
        }
    }
}

impl Default for ButtonRegistry {
    fn default() -> Self {
        Self::new()
    }
}
