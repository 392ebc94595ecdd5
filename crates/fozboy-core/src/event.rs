use std::time::Duration;

/// Everything the update loop reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Resize { cols: u16, rows: u16 },
    Key(crossterm::event::KeyEvent),
    /// A scheduled release-timer tick has come due.
    Tick,
    ImageLoaded,
    /// Loading failed at the I/O boundary; `reason` is already display text.
    ImageFailed { reason: String },
    Quit,
}

/// Side effects requested by [`crate::state::update`] for the loop to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmd {
    None,
    Quit,
    /// Deliver [`Event::Tick`] after this delay.
    ScheduleTick(Duration),
    LoadImage,
    ClearImage,
}
