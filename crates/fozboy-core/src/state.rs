//! Application state and the pure update function.
//!
//! [`update`] takes the current [`AppState`] by value and an [`Event`] and
//! returns the next state plus the [`Cmd`] the loop should carry out. It
//! performs no I/O: image loading, terminal writes and timers all happen in
//! the app crate in response to the returned command.

use crate::event::{Cmd, Event};
use crate::input::{self, InputEvent, InputPolicy, InputState, KeyAction};
use crate::layout::{compute_panel_geometry, PanelGeometry, TerminalGeometry};

pub const LOAD_HINT: &str = "Press SPACE to load image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    Empty,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub terminal: TerminalGeometry,
    pub panel: PanelGeometry,
    pub input: InputState,
    pub policy: InputPolicy,
    pub image: ImageStatus,
}

impl AppState {
    pub fn new(policy: InputPolicy) -> Self {
        Self {
            terminal: TerminalGeometry::default(),
            panel: PanelGeometry::default(),
            input: InputState::default(),
            policy,
            image: ImageStatus::Empty,
        }
    }

    /// Single line of text shown inside the panel, if any.
    pub fn status_text(&self) -> Option<&str> {
        match &self.image {
            ImageStatus::Empty => Some(LOAD_HINT),
            ImageStatus::Failed(reason) => Some(reason),
            ImageStatus::Loaded => None,
        }
    }
}

/// Fold one event into the state.
pub fn update(mut state: AppState, event: Event) -> (AppState, Cmd) {
    match event {
        Event::Resize { cols, rows } => {
            state.terminal = TerminalGeometry::new(cols, rows);
            state.panel = compute_panel_geometry(cols, rows);
            tracing::debug!(
                cols,
                rows,
                border_width = state.panel.border_width,
                border_height = state.panel.border_height,
                "panel geometry recomputed"
            );
            (state, Cmd::None)
        }

        Event::Key(key) => {
            let pressed = input::is_press(&key);
            match input::classify(&key) {
                KeyAction::Quit if pressed => (state, Cmd::Quit),
                KeyAction::LoadImage if pressed => {
                    if state.image == ImageStatus::Loaded {
                        (state, Cmd::None)
                    } else {
                        (state, Cmd::LoadImage)
                    }
                }
                KeyAction::ClearImage if pressed => {
                    if state.image == ImageStatus::Empty {
                        (state, Cmd::None)
                    } else {
                        state.image = ImageStatus::Empty;
                        (state, Cmd::ClearImage)
                    }
                }
                KeyAction::Control(id) => {
                    let input_event = if pressed {
                        InputEvent::Press(id)
                    } else {
                        InputEvent::Release(id)
                    };
                    step_input(state, input_event)
                }
                _ => (state, Cmd::None),
            }
        }

        Event::Tick => step_input(state, InputEvent::Tick),

        Event::ImageLoaded => {
            state.image = ImageStatus::Loaded;
            (state, Cmd::None)
        }

        Event::ImageFailed { reason } => {
            state.image = ImageStatus::Failed(reason);
            (state, Cmd::None)
        }

        Event::Quit => (state, Cmd::Quit),
    }
}

fn step_input(mut state: AppState, event: InputEvent) -> (AppState, Cmd) {
    let transition = state.input.step(&state.policy, event);
    state.input = transition.state;
    let cmd = match transition.next_tick {
        Some(delay) => Cmd::ScheduleTick(delay),
        None => Cmd::None,
    };
    (state, cmd)
}
