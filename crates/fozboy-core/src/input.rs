//! Device controls and the pressed/released state machine.
//!
//! Terminals either report key releases (with the keyboard enhancement
//! protocol) or only presses. [`InputPolicy`] picks how a release is
//! detected: directly from release events, or synthetically after a few
//! ticks pass without a new press. The machine itself never touches a
//! timer; [`InputState::step`] returns the next tick to schedule, and not
//! returning one is how the timer is disarmed.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A button on the virtual device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    A,
    B,
    Up,
    Down,
    Left,
    Right,
    Start,
    Select,
}

impl ControlId {
    pub const ALL: [ControlId; 8] = [
        ControlId::A,
        ControlId::B,
        ControlId::Up,
        ControlId::Down,
        ControlId::Left,
        ControlId::Right,
        ControlId::Start,
        ControlId::Select,
    ];

    fn index(self) -> usize {
        match self {
            ControlId::A => 0,
            ControlId::B => 1,
            ControlId::Up => 2,
            ControlId::Down => 3,
            ControlId::Left => 4,
            ControlId::Right => 5,
            ControlId::Start => 6,
            ControlId::Select => 7,
        }
    }

    /// Map a key code to a control. Several keys alias the same control.
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Char('a') | KeyCode::Char('x') => Some(ControlId::A),
            KeyCode::Char('b') | KeyCode::Char('z') => Some(ControlId::B),
            KeyCode::Left | KeyCode::Char('h') => Some(ControlId::Left),
            KeyCode::Right | KeyCode::Char('l') => Some(ControlId::Right),
            KeyCode::Up | KeyCode::Char('k') => Some(ControlId::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(ControlId::Down),
            KeyCode::Char('n') => Some(ControlId::Start),
            KeyCode::Char('m') => Some(ControlId::Select),
            _ => None,
        }
    }
}

/// Pressed state for every control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusMap {
    pressed: [bool; 8],
}

impl FocusMap {
    pub fn is_pressed(&self, id: ControlId) -> bool {
        self.pressed[id.index()]
    }

    pub fn set(&mut self, id: ControlId, pressed: bool) {
        self.pressed[id.index()] = pressed;
    }

    pub fn any_pressed(&self) -> bool {
        self.pressed.iter().any(|&p| p)
    }

    pub fn clear(&mut self) {
        self.pressed = [false; 8];
    }
}

/// What a key means to the application, before any state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Control(ControlId),
    LoadImage,
    ClearImage,
    Quit,
    Ignored,
}

/// Classify a key event by its code and modifiers. The event kind
/// (press/repeat/release) is left to the caller.
pub fn classify(key: &KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char(' ') => KeyAction::LoadImage,
        KeyCode::Backspace => KeyAction::ClearImage,
        code => ControlId::from_key(code)
            .map(KeyAction::Control)
            .unwrap_or(KeyAction::Ignored),
    }
}

/// Returns true for presses and auto-repeats.
pub fn is_press(key: &KeyEvent) -> bool {
    matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
}

/// Synthetic release timing for terminals without release events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseTimer {
    pub tick_interval: Duration,
    /// Controls are released once this many ticks pass with no press.
    pub release_after: u32,
}

impl Default for ReleaseTimer {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1) / 60,
            release_after: 3,
        }
    }
}

impl ReleaseTimer {
    pub fn from_rate(tick_hz: u32, release_after: u32) -> Self {
        Self {
            tick_interval: Duration::from_secs(1) / tick_hz.max(1),
            release_after,
        }
    }
}

/// How key releases are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPolicy {
    /// The terminal reports releases; apply them as they arrive.
    EdgeTriggered,
    /// Only presses are reported; release everything after a quiet period.
    TimeoutRelease(ReleaseTimer),
}

impl InputPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            InputPolicy::EdgeTriggered => "edge",
            InputPolicy::TimeoutRelease(_) => "timeout",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickState {
    pub ticks_since_press: u32,
    pub armed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Press(ControlId),
    Release(ControlId),
    Tick,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub focus: FocusMap,
    pub ticks: TickState,
}

/// Result of one step: the new state plus the tick to schedule, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: InputState,
    pub next_tick: Option<Duration>,
}

impl InputState {
    pub fn step(self, policy: &InputPolicy, event: InputEvent) -> Transition {
        match policy {
            InputPolicy::EdgeTriggered => self.step_edge(event),
            InputPolicy::TimeoutRelease(timer) => self.step_timeout(timer, event),
        }
    }

    fn step_edge(mut self, event: InputEvent) -> Transition {
        match event {
            InputEvent::Press(id) => self.focus.set(id, true),
            InputEvent::Release(id) => self.focus.set(id, false),
            InputEvent::Tick => {}
        }
        Transition {
            state: self,
            next_tick: None,
        }
    }

    fn step_timeout(mut self, timer: &ReleaseTimer, event: InputEvent) -> Transition {
        let next_tick = match event {
            InputEvent::Press(id) => {
                self.focus.set(id, true);
                self.ticks.ticks_since_press = 0;
                if self.ticks.armed {
                    // The pending tick keeps running.
                    None
                } else {
                    self.ticks.armed = true;
                    tracing::trace!(control = ?id, "release timer armed");
                    Some(timer.tick_interval)
                }
            }
            // Release events are not trusted in this mode.
            InputEvent::Release(_) => None,
            InputEvent::Tick if !self.ticks.armed => None,
            InputEvent::Tick => {
                self.ticks.ticks_since_press += 1;
                if self.ticks.ticks_since_press > timer.release_after {
                    self.focus.clear();
                    self.ticks = TickState::default();
                    tracing::trace!("release timer expired, controls released");
                    None
                } else {
                    Some(timer.tick_interval)
                }
            }
        };
        Transition {
            state: self,
            next_tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout_policy() -> InputPolicy {
        InputPolicy::TimeoutRelease(ReleaseTimer::default())
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn aliases_map_to_same_control() {
        assert_eq!(ControlId::from_key(KeyCode::Left), Some(ControlId::Left));
        assert_eq!(ControlId::from_key(KeyCode::Char('h')), Some(ControlId::Left));
        assert_eq!(ControlId::from_key(KeyCode::Char('x')), Some(ControlId::A));
        assert_eq!(ControlId::from_key(KeyCode::Char('z')), Some(ControlId::B));
        assert_eq!(ControlId::from_key(KeyCode::Char('n')), Some(ControlId::Start));
        assert_eq!(ControlId::from_key(KeyCode::Char('m')), Some(ControlId::Select));
    }

    #[test]
    fn classify_quit_and_actions() {
        assert_eq!(classify(&key(KeyCode::Esc, KeyEventKind::Press)), KeyAction::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(classify(&ctrl_c), KeyAction::Quit);
        assert_eq!(
            classify(&key(KeyCode::Char(' '), KeyEventKind::Press)),
            KeyAction::LoadImage
        );
        assert_eq!(
            classify(&key(KeyCode::Backspace, KeyEventKind::Press)),
            KeyAction::ClearImage
        );
        assert_eq!(
            classify(&key(KeyCode::Char('k'), KeyEventKind::Press)),
            KeyAction::Control(ControlId::Up)
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(
            classify(&key(KeyCode::Char('c'), KeyEventKind::Press)),
            KeyAction::Ignored
        );
        assert_eq!(classify(&key(KeyCode::F(5), KeyEventKind::Press)), KeyAction::Ignored);
        assert_eq!(classify(&key(KeyCode::Tab, KeyEventKind::Press)), KeyAction::Ignored);
    }

    #[test]
    fn repeat_counts_as_press() {
        assert!(is_press(&key(KeyCode::Char('a'), KeyEventKind::Press)));
        assert!(is_press(&key(KeyCode::Char('a'), KeyEventKind::Repeat)));
        assert!(!is_press(&key(KeyCode::Char('a'), KeyEventKind::Release)));
    }

    #[test]
    fn focus_map_set_and_clear() {
        let mut focus = FocusMap::default();
        assert!(!focus.any_pressed());
        focus.set(ControlId::Start, true);
        focus.set(ControlId::B, true);
        assert!(focus.is_pressed(ControlId::Start));
        assert!(!focus.is_pressed(ControlId::Select));
        focus.clear();
        for id in ControlId::ALL {
            assert!(!focus.is_pressed(id));
        }
    }

    #[test]
    fn edge_press_then_release() {
        let policy = InputPolicy::EdgeTriggered;
        let t = InputState::default().step(&policy, InputEvent::Press(ControlId::A));
        assert!(t.state.focus.is_pressed(ControlId::A));
        assert_eq!(t.next_tick, None);

        let t = t.state.step(&policy, InputEvent::Release(ControlId::A));
        assert!(!t.state.focus.is_pressed(ControlId::A));
        assert_eq!(t.next_tick, None);
        assert_eq!(t.state.ticks, TickState::default());
    }

    #[test]
    fn edge_release_only_affects_its_control() {
        let policy = InputPolicy::EdgeTriggered;
        let s = InputState::default()
            .step(&policy, InputEvent::Press(ControlId::Up))
            .state
            .step(&policy, InputEvent::Press(ControlId::B))
            .state
            .step(&policy, InputEvent::Release(ControlId::Up))
            .state;
        assert!(!s.focus.is_pressed(ControlId::Up));
        assert!(s.focus.is_pressed(ControlId::B));
    }

    #[test]
    fn timeout_press_arms_once() {
        let policy = timeout_policy();
        let t = InputState::default().step(&policy, InputEvent::Press(ControlId::A));
        assert!(t.state.ticks.armed);
        assert_eq!(t.next_tick, Some(Duration::from_secs(1) / 60));

        // A second press while armed reuses the pending tick.
        let t = t.state.step(&policy, InputEvent::Press(ControlId::B));
        assert!(t.state.ticks.armed);
        assert_eq!(t.next_tick, None);
    }

    #[test]
    fn timeout_releases_after_fourth_tick() {
        let policy = timeout_policy();
        let mut s = InputState::default()
            .step(&policy, InputEvent::Press(ControlId::Left))
            .state;

        for expected in 1..=3 {
            let t = s.step(&policy, InputEvent::Tick);
            assert_eq!(t.state.ticks.ticks_since_press, expected);
            assert!(t.state.focus.is_pressed(ControlId::Left));
            assert!(t.next_tick.is_some());
            s = t.state;
        }

        let t = s.step(&policy, InputEvent::Tick);
        assert!(!t.state.focus.any_pressed());
        assert!(!t.state.ticks.armed);
        assert_eq!(t.next_tick, None);
    }

    #[test]
    fn timeout_press_mid_countdown_postpones_release() {
        let policy = timeout_policy();
        let mut s = InputState::default()
            .step(&policy, InputEvent::Press(ControlId::A))
            .state;
        s = s.step(&policy, InputEvent::Tick).state;
        s = s.step(&policy, InputEvent::Tick).state;

        let t = s.step(&policy, InputEvent::Press(ControlId::A));
        assert_eq!(t.state.ticks.ticks_since_press, 0);
        assert_eq!(t.next_tick, None);
        s = t.state;

        for _ in 0..3 {
            let t = s.step(&policy, InputEvent::Tick);
            assert!(t.state.focus.is_pressed(ControlId::A));
            s = t.state;
        }
        let t = s.step(&policy, InputEvent::Tick);
        assert!(!t.state.focus.is_pressed(ControlId::A));
    }

    #[test]
    fn timeout_ignores_release_events() {
        let policy = timeout_policy();
        let t = InputState::default()
            .step(&policy, InputEvent::Press(ControlId::Down))
            .state
            .step(&policy, InputEvent::Release(ControlId::Down));
        assert!(t.state.focus.is_pressed(ControlId::Down));
        assert!(t.state.ticks.armed);
        assert_eq!(t.next_tick, None);
    }

    #[test]
    fn timeout_stale_tick_is_noop() {
        let policy = timeout_policy();
        let t = InputState::default().step(&policy, InputEvent::Tick);
        assert_eq!(t.state, InputState::default());
        assert_eq!(t.next_tick, None);
    }

    #[test]
    fn timeout_rearms_after_release() {
        let policy = timeout_policy();
        let mut s = InputState::default()
            .step(&policy, InputEvent::Press(ControlId::Start))
            .state;
        for _ in 0..4 {
            s = s.step(&policy, InputEvent::Tick).state;
        }
        assert!(!s.ticks.armed);

        let t = s.step(&policy, InputEvent::Press(ControlId::Select));
        assert!(t.state.ticks.armed);
        assert!(t.next_tick.is_some());
    }

    #[test]
    fn release_timer_from_rate() {
        let timer = ReleaseTimer::from_rate(30, 5);
        assert_eq!(timer.tick_interval, Duration::from_secs(1) / 30);
        assert_eq!(timer.release_after, 5);
        // A zero rate would divide by zero; it is treated as 1 Hz.
        assert_eq!(ReleaseTimer::from_rate(0, 3).tick_interval, Duration::from_secs(1));
    }
}
