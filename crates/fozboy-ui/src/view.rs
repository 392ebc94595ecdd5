use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
};
use unicode_width::UnicodeWidthChar;

use fozboy_core::input::{ControlId, FocusMap};
use fozboy_core::layout::{PanelGeometry, TerminalGeometry};

/// Below this size the panel is not drawn at all.
pub const MIN_TERMINAL_WIDTH: u16 = 50;
pub const MIN_TERMINAL_HEIGHT: u16 = 15;

pub const LOADING_TEXT: &str = "Loading...";
pub const RESIZE_TEXT: &str = "Terminal too small. Please resize.";

/// Gap between the panel's right border and the controls column.
const CONTROLS_GAP: u16 = 4;
/// Rows spanned by the controls column.
const CONTROLS_HEIGHT: i32 = 9;

const PRESSED: Color = Color::LightRed;
const RELEASED: Color = Color::LightGreen;

/// Which screen a terminal size gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// No size reported yet.
    Loading,
    ResizeRequired,
    Panel,
}

/// Everything the device screen needs for one frame.
pub struct DeviceView<'a> {
    pub terminal: TerminalGeometry,
    pub panel: PanelGeometry,
    pub focus: FocusMap,
    pub status: Option<&'a str>,
}

pub fn screen_for(terminal: TerminalGeometry) -> Screen {
    if terminal.width == 0 || terminal.height == 0 {
        Screen::Loading
    } else if terminal.width < MIN_TERMINAL_WIDTH || terminal.height < MIN_TERMINAL_HEIGHT {
        Screen::ResizeRequired
    } else {
        Screen::Panel
    }
}

/// Draw the device screen into `buf`, clipped to `area`, and report which
/// screen was drawn.
pub fn render_device(buf: &mut Buffer, area: Rect, view: &DeviceView<'_>) -> Screen {
    let screen = screen_for(view.terminal);
    match screen {
        Screen::Loading => put(buf, area, 0, 0, LOADING_TEXT, Style::default()),
        Screen::ResizeRequired => put(buf, area, 0, 0, RESIZE_TEXT, Style::default()),
        Screen::Panel => render_panel(buf, area, view),
    }
    screen
}

fn render_panel(buf: &mut Buffer, area: Rect, view: &DeviceView<'_>) {
    let panel = view.panel;
    let (ox, oy) = panel.origin(view.terminal);
    let width = panel.border_width;
    let height = panel.border_height;
    let inner = usize::from(width.saturating_sub(2));
    let border = Style::default();

    put(buf, area, ox, oy, &format!("╭{}╮", "─".repeat(inner)), border);
    for row in 1..height.saturating_sub(1) {
        let y = oy.saturating_add(row);
        if y >= area.height {
            break;
        }
        put(buf, area, ox, y, &format!("│{}│", " ".repeat(inner)), border);
    }
    put(
        buf,
        area,
        ox,
        oy.saturating_add(height.saturating_sub(1)),
        &format!("╰{}╯", "─".repeat(inner)),
        border,
    );

    if let Some(status) = view.status.filter(|s| !s.is_empty()) {
        let (text, left_pad) = fit_centered(status, inner);
        put(
            buf,
            area,
            ox.saturating_add(1).saturating_add(left_pad),
            oy.saturating_add(height / 2),
            &text,
            border,
        );
    }

    let controls_x = ox.saturating_add(width).saturating_add(CONTROLS_GAP);
    render_controls(buf, area, view, controls_x, oy);

    let footer = format!(
        "Terminal: {}x{}  Border: {}x{} (ratio: {:.2})",
        view.terminal.width,
        view.terminal.height,
        width,
        height,
        panel.ratio()
    );
    put(
        buf,
        area,
        0,
        oy.saturating_add(height).saturating_add(1),
        &footer,
        Style::default(),
    );
}

/// The controls column, vertically centered against the panel.
fn render_controls(buf: &mut Buffer, area: Rect, view: &DeviceView<'_>, x: u16, oy: u16) {
    let height = i32::from(view.panel.border_height);
    let start = (height - CONTROLS_HEIGHT) / 2;

    // (row within the column, indent, control)
    let layout: [(i32, u16, ControlId); 8] = [
        (0, 4, ControlId::Up),
        (1, 0, ControlId::Left),
        (1, 8, ControlId::Right),
        (2, 4, ControlId::Down),
        (4, 4, ControlId::B),
        (5, 4, ControlId::A),
        (7, 2, ControlId::Start),
        (8, 2, ControlId::Select),
    ];

    for (rel, indent, id) in layout {
        let row = start + rel;
        if row < 0 || row >= height {
            continue;
        }
        let Ok(row) = u16::try_from(row) else {
            continue;
        };
        let color = if view.focus.is_pressed(id) {
            PRESSED
        } else {
            RELEASED
        };
        put(
            buf,
            area,
            x.saturating_add(indent),
            oy.saturating_add(row),
            &format!("[ {} ]", label(id)),
            Style::default().fg(color),
        );
    }
}

fn label(id: ControlId) -> &'static str {
    match id {
        ControlId::Up => "↑",
        ControlId::Down => "↓",
        ControlId::Left => "←",
        ControlId::Right => "→",
        ControlId::A => "A",
        ControlId::B => "B",
        ControlId::Start => "Start",
        ControlId::Select => "Select",
    }
}

/// Cut `text` to `width` display cells from the right (no ellipsis) and
/// return it with the left padding that centers it.
fn fit_centered(text: &str, width: usize) -> (String, u16) {
    let mut used = 0;
    let mut fitted = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        fitted.push(c);
    }
    let left_pad = (width - used) / 2;
    (fitted, u16::try_from(left_pad).unwrap_or(0))
}

/// Write `text` at `(x, y)` relative to `area`, clipped to it.
fn put(buf: &mut Buffer, area: Rect, x: u16, y: u16, text: &str, style: Style) {
    let clip = area.intersection(buf.area);
    let (Some(x), Some(y)) = (area.x.checked_add(x), area.y.checked_add(y)) else {
        return;
    };
    if x >= clip.right() || y >= clip.bottom() || x < clip.left() || y < clip.top() {
        return;
    }
    let max_width = usize::from(clip.right() - x);
    buf.set_stringn(x, y, text, max_width, style);
}
