//! User interface subsystem - touch control surface of the board.
//!
//! The control surface owns the button registry, the UI mode state and
//! the touch dispatcher, and turns dispatched touches into commands for
//! the game engine. The engine in turn updates cell states, the
//! awaiting-human flag and, on restart, the mode.
//!
//! ## Components
//!
//! - **Buttons**: 64 board cells + 2 game mode + 3 difficulty selectors
//! - **Mode**: Settings / Play state machine
//! - **Display**: `embedded-graphics` rendering of the registry

pub mod buttons;
pub mod display;
pub mod input_logic;
pub mod mode;


pub use buttons::{ButtonDescriptor, ButtonId, ButtonKind, ButtonRegistry, Player, VisualState};
pub use mode::{Difficulty, GameMode, UiMode, UiState};

use crate::touch::{TouchDispatcher, TouchEvent, TouchSampler};

/// Touch input interpreted for the game engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Game mode chosen; settings still incomplete.
    SelectGameMode(GameMode),
    /// Difficulty chosen; settings still incomplete.
    SelectDifficulty(Difficulty),
    /// Settings complete; the board is now active.
    StartGame {
        mode: GameMode,
        difficulty: Difficulty,
    },
    /// Human move on a board cell.
    PlayCell { row: usize, col: usize },
}

/// Registry + mode + dispatcher, owned by the control loop.
#[derive(Clone, Debug)]
pub struct ControlSurface {
    registry: ButtonRegistry,
    ui: UiState,
    dispatcher: TouchDispatcher,
}

impl ControlSurface {
    /// Fresh surface in Settings with every button neutral.
    pub fn new() -> Self {
        Self {
            registry: ButtonRegistry::new(),
            ui: UiState::new(),
            dispatcher: TouchDispatcher::new(),
        }
    }

    pub fn registry(&self) -> &ButtonRegistry {
        &self.registry
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn mode(&self) -> UiMode {
        self.ui.current_mode()
    }

    /// Buttons live in the current mode.
    pub fn active_set(&self) -> &[ButtonDescriptor] {
        self.registry.active_set(self.ui.current_mode())
    }

    /// Poll the panel once; returns a command for a fresh press on an
    /// active button, if it means anything in the current state.
    pub fn poll<T: TouchSampler + ?Sized>(&mut self, touch: &mut T) -> Option<Command> {
        let event = self
            .dispatcher
            .poll(touch, &self.registry, self.ui.current_mode());
        self.handle_event(event)
    }

    /// Interpret a dispatched event.
    pub fn handle_event(&mut self, event: TouchEvent) -> Option<Command> {
        event.button?;
        let id = self.dispatcher.take_pending()?;
        self.press(id)
    }

    /// Interpret a press on `id`. Buttons outside the current mode's
    /// active set are ignored.
    pub fn press(&mut self, id: ButtonId) -> Option<Command> {
        if !self.active_set().iter().any(|b| b.id() == id) {
            debug!("UI: button {} inactive in {:?}", id.raw(), self.mode());
            return None;
        }
        match id.kind() {
            ButtonKind::GameMode(mode) => {
                self.select(ButtonId::game_mode(mode), &GameMode::ALL.map(ButtonId::game_mode));
                if self.ui.select_game_mode(mode) {
                    return self.start_command();
                }
                Some(Command::SelectGameMode(mode))
            }
            ButtonKind::Difficulty(difficulty) => {
                self.select(
                    ButtonId::difficulty(difficulty),
                    &Difficulty::ALL.map(ButtonId::difficulty),
                );
                if self.ui.select_difficulty(difficulty) {
                    return self.start_command();
                }
                Some(Command::SelectDifficulty(difficulty))
            }
            ButtonKind::Cell { row, col } => {
                if !self.ui.is_awaiting_human_input() {
                    debug!("UI: cell ({}, {}) ignored, not waiting for a move", row, col);
                    return None;
                }
                Some(Command::PlayCell { row, col })
            }
        }
    }

    pub fn set_cell_state(&mut self, row: usize, col: usize, state: VisualState) {
        if let Some(id) = ButtonId::cell(row, col) {
            self.registry.set_state(id, state);
        }
    }

    pub fn set_state(&mut self, id: ButtonId, state: VisualState) {
        self.registry.set_state(id, state);
    }

    pub fn set_awaiting_human_input(&mut self, awaiting: bool) {
        self.ui.set_awaiting_human_input(awaiting);
    }

    pub fn is_awaiting_human_input(&self) -> bool {
        self.ui.is_awaiting_human_input()
    }

    /// Clear the board and selections and return to Settings.
    pub fn new_game(&mut self) {
        self.registry.reset_grid();
        self.registry.reset_selectors();
        self.ui.enter_settings();
        self.dispatcher.take_pending();
    }

    /// Mark `chosen` selected and the rest of its group neutral.
    fn select(&mut self, chosen: ButtonId, group: &[ButtonId]) {
        for &id in group {
            let state = if id == chosen {
                VisualState::Selected
            } else {
                VisualState::Neutral
            };
            self.registry.set_state(id, state);
        }
    }

    fn start_command(&self) -> Option<Command> {
        Some(Command::StartGame {
            mode: self.ui.game_mode()?,
            difficulty: self.ui.difficulty()?,
        })
    }
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self::new()
    }
}
