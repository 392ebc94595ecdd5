mod policy;
mod terminal;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event as CEvent};

use fozboy_config::{Config, InputPolicyKind};
use fozboy_core::{
    bus::EventBus,
    event::{Cmd, Event},
    input::InputPolicy,
    logging,
    state::{update, AppState},
};
use fozboy_ui::{
    kitty::{self, ImageFrame},
    view::{render_device, screen_for, DeviceView, Screen},
};

use terminal::Tui;

/// Longest wait for input when no release tick is pending.
const IDLE_POLL: Duration = Duration::from_millis(100);

struct App {
    bus: EventBus,
    image_path: PathBuf,
    /// Encoded screen image, kept until cleared.
    image: Option<ImageFrame>,
    /// The cached image must be (re)sent after the next draw.
    transmit_pending: bool,
    next_tick: Option<Instant>,
}

impl App {
    fn new(image_path: PathBuf) -> Self {
        Self {
            bus: EventBus::new(),
            image_path,
            image: None,
            transmit_pending: false,
            next_tick: None,
        }
    }

    /// Carry out a command from `update`. Returns `true` when the loop
    /// should stop.
    fn execute(&mut self, cmd: Cmd, state: &AppState, writer: &mut impl Write) -> Result<bool> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => return Ok(true),
            Cmd::ScheduleTick(delay) => self.next_tick = Some(Instant::now() + delay),
            Cmd::LoadImage => self.load_image(state),
            Cmd::ClearImage => {
                self.image = None;
                self.transmit_pending = false;
                kitty::clear_images(writer).context("failed to clear terminal images")?;
                tracing::info!("image cleared");
            }
        }
        Ok(false)
    }

    /// Read and encode the screen image. Failures become status text.
    fn load_image(&mut self, state: &AppState) {
        match read_payload(&self.image_path) {
            Ok(payload) => {
                let placement = state.panel.image_placement(state.terminal);
                let frame = kitty::encode_image(&payload, placement.cols, placement.rows);
                tracing::info!(
                    path = %self.image_path.display(),
                    payload_bytes = payload.len(),
                    chunks = frame.chunks().len(),
                    cols = frame.cols(),
                    rows = frame.rows(),
                    "image encoded"
                );
                self.image = Some(frame);
                self.transmit_pending = true;
                self.bus.publish(Event::ImageLoaded);
            }
            Err(err) => {
                tracing::warn!(path = %self.image_path.display(), error = %err, "image load failed");
                self.bus.publish(Event::ImageFailed {
                    reason: format!("Error loading image: {err:#}"),
                });
            }
        }
    }

    /// Send the cached image if one is waiting and the panel is on screen.
    fn flush_image(&mut self, state: &AppState, writer: &mut impl Write) -> Result<()> {
        if !self.transmit_pending || screen_for(state.terminal) != Screen::Panel {
            return Ok(());
        }
        if let Some(frame) = &self.image {
            let placement = state.panel.image_placement(state.terminal);
            kitty::transmit(writer, placement, frame).context("failed to transmit image")?;
            tracing::debug!(row = placement.row, col = placement.col, "image transmitted");
        }
        self.transmit_pending = false;
        Ok(())
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        match self.next_tick {
            Some(due) => due.saturating_duration_since(now).min(IDLE_POLL),
            None => IDLE_POLL,
        }
    }

    fn fire_due_tick(&mut self, now: Instant) {
        if matches!(self.next_tick, Some(due) if now >= due) {
            self.next_tick = None;
            self.bus.publish(Event::Tick);
        }
    }

    /// Fold every queued event into `state`, including events published by
    /// the commands those events produce, so the next draw sees them all.
    /// The flag is `true` when the loop should stop.
    fn process_pending(
        &mut self,
        mut state: AppState,
        writer: &mut impl Write,
    ) -> Result<(AppState, bool)> {
        while self.bus.has_pending() {
            for ev in self.bus.drain() {
                if matches!(ev, Event::Resize { .. }) && self.image.is_some() {
                    // The terminal is cleared on resize, taking the image with it.
                    self.transmit_pending = true;
                }
                let (next, cmd) = update(state, ev);
                state = next;
                if self.execute(cmd, &state, writer)? {
                    return Ok((state, true));
                }
            }
        }
        Ok((state, false))
    }
}

fn read_payload(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(kitty::png_payload(&bytes)?)
}

fn main() -> Result<()> {
    let _log_guard = logging::init();
    tracing::info!("fozboy starting up");

    let config = Config::load()?;
    let want_release_events = config.input.policy != InputPolicyKind::Timeout;

    let mut session = terminal::setup(want_release_events)?;
    let policy = policy::resolve(&config.input, session.keyboard_enhanced);
    tracing::info!(
        policy = policy.name(),
        keyboard_enhanced = session.keyboard_enhanced,
        "input policy selected"
    );
    if policy == InputPolicy::EdgeTriggered && !session.keyboard_enhanced {
        tracing::warn!("edge-triggered input forced but the terminal did not enable release events");
    }

    let res = run(&mut session.terminal, config.image.path, policy);
    terminal::restore(session)?;
    res
}

fn run(terminal: &mut Tui, image_path: PathBuf, policy: InputPolicy) -> Result<()> {
    let mut app = App::new(image_path);
    let mut state = AppState::new(policy);

    let size = terminal.size()?;
    app.bus.publish(Event::Resize {
        cols: size.width,
        rows: size.height,
    });

    loop {
        // ── Render ──
        terminal.draw(|f| {
            let view = DeviceView {
                terminal: state.terminal,
                panel: state.panel,
                focus: state.input.focus,
                status: state.status_text(),
            };
            let area = f.area();
            render_device(f.buffer_mut(), area, &view);
        })?;
        app.flush_image(&state, terminal.backend_mut())?;

        // ── Poll → Publish ──
        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                CEvent::Key(key) => app.bus.publish(Event::Key(key)),
                CEvent::Resize(cols, rows) => app.bus.publish(Event::Resize { cols, rows }),
                _ => {}
            }
        }
        app.fire_due_tick(Instant::now());

        // ── Drain → Update ──
        let (next, quit) = app.process_pending(state, terminal.backend_mut())?;
        state = next;
        if quit {
            tracing::info!("quit requested");
            return Ok(());
        }
    }
}
