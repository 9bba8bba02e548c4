//! UI mode state machine.
//!
//! Two modes: `Settings` (initial, game mode and difficulty selectors) and
//! `Play` (8×8 board). Settings → Play happens once both a game mode and
//! a difficulty have been chosen. Play → Settings is only ever requested
//! from outside (restart / new game).

/// Which control surface is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiMode {
    #[default]
    Settings,
    Play,
}

/// Who plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GameMode {
    HumanVsAi,
    AiVsAi,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::HumanVsAi, GameMode::AiVsAi];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            GameMode::HumanVsAi => "Human-AI",
            GameMode::AiVsAi => "AI - AI",
        }
    }

    /// Whether any turn waits for a touch.
    pub const fn has_human_player(self) -> bool {
        matches!(self, GameMode::HumanVsAi)
    }
}

/// AI strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// Current mode plus the settings chosen so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    mode: UiMode,
    awaiting_human: bool,
    game_mode: Option<GameMode>,
    difficulty: Option<Difficulty>,
}

impl UiState {
    pub const fn new() -> Self {
        Self {
            mode: UiMode::Settings,
            awaiting_human: false,
            game_mode: None,
            difficulty: None,
        }
    }

    pub fn current_mode(&self) -> UiMode {
        self.mode
    }

    pub fn game_mode(&self) -> Option<GameMode> {
        self.game_mode
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// Record a game mode choice. Returns `true` if this completed the
    /// settings and switched to `Play`.
    pub fn select_game_mode(&mut self, mode: GameMode) -> bool {
        self.game_mode = Some(mode);
        self.enter_play()
    }

    /// Record a difficulty choice. Returns `true` if this completed the
    /// settings and switched to `Play`.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> bool {
        self.difficulty = Some(difficulty);
        self.enter_play()
    }

    /// Switch to `Play` if both settings are chosen.
    ///
    /// Returns `true` only on an actual Settings → Play transition.
    pub fn enter_play(&mut self) -> bool {
        if self.mode == UiMode::Play {
            return false;
        }
        if self.game_mode.is_none() || self.difficulty.is_none() {
            debug!("UI: settings incomplete, staying in Settings");
            return false;
        }
        info!("UI: {:?} -> {:?}", self.mode, UiMode::Play);
        self.mode = UiMode::Play;
        self.awaiting_human = false;
        true
    }

    /// Back to `Settings`, forgetting the previous choices.
    pub fn enter_settings(&mut self) {
        if self.mode != UiMode::Settings {
            info!("UI: {:?} -> {:?}", self.mode, UiMode::Settings);
        }
        *self = Self::new();
    }

    pub fn set_awaiting_human_input(&mut self, awaiting: bool) {
        self.awaiting_human = awaiting;
    }

    /// True only in `Play`, with a human player, while flagged.
    pub fn is_awaiting_human_input(&self) -> bool {
        self.awaiting_human
            && self.mode == UiMode::Play
            && self.game_mode.is_some_and(GameMode::has_human_player)
    }
}
