use std::io::{self, Stdout};

use anyhow::Result;
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub struct Session {
    pub terminal: Tui,
    /// The terminal accepted the keyboard enhancement flags and will report
    /// key releases.
    pub keyboard_enhanced: bool,
}

/// Enter raw mode and the alternate screen. When `want_release_events` is
/// set, ask the terminal to report key event types as well.
pub fn setup(want_release_events: bool) -> Result<Session> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let keyboard_enhanced = want_release_events
        && matches!(supports_keyboard_enhancement(), Ok(true))
        && execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )
        .is_ok();

    let backend = CrosstermBackend::new(stdout);
    Ok(Session {
        terminal: Terminal::new(backend)?,
        keyboard_enhanced,
    })
}

pub fn restore(mut session: Session) -> Result<()> {
    if session.keyboard_enhanced {
        let _ = execute!(session.terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(session.terminal.backend_mut(), LeaveAlternateScreen)?;
    session.terminal.show_cursor()?;
    Ok(())
}
