//! Panel geometry for the fixed-aspect device screen.
//!
//! The device panel is kept at a 20:9 cell ratio and fitted into whatever
//! the terminal has left after fixed margins. Everything here is pure
//! integer arithmetic so the same terminal size always yields the same
//! panel.

/// Columns reserved around the panel (controls column, breathing room).
pub const MARGIN_COLS: u16 = 20;
/// Rows reserved around the panel (footer, breathing room).
pub const MARGIN_ROWS: u16 = 4;

pub const MIN_PANEL_WIDTH: u16 = 10;
pub const MIN_PANEL_HEIGHT: u16 = 5;

const RATIO_WIDTH: i32 = 20;
const RATIO_HEIGHT: i32 = 9;

/// Cells trimmed from each panel dimension to size the inline image.
pub const IMAGE_PADDING: u16 = 4;

/// Terminal size in character cells, as last reported by a resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalGeometry {
    pub width: u16,
    pub height: u16,
}

impl TerminalGeometry {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Outer size of the bordered device panel, border cells included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelGeometry {
    pub border_width: u16,
    pub border_height: u16,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self {
            border_width: MIN_PANEL_WIDTH,
            border_height: MIN_PANEL_HEIGHT,
        }
    }
}

/// Where and how large the inline image is drawn, in 0-indexed cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePlacement {
    pub row: u16,
    pub col: u16,
    pub cols: u16,
    pub rows: u16,
}

/// Fit a 20:9 panel into a terminal of `width` × `height` cells.
///
/// The margins are subtracted first and the remaining space is floored at
/// the minimum panel size. Whichever dimension binds decides the panel: if
/// the width implied by the available height fits, height binds; otherwise
/// width binds and the height is derived from it. The result is floored
/// again because the derived dimension can dip under the minimum for
/// extreme shapes; in that case the ratio degrades instead of failing.
pub fn compute_panel_geometry(width: u16, height: u16) -> PanelGeometry {
    let min_w = i32::from(MIN_PANEL_WIDTH);
    let min_h = i32::from(MIN_PANEL_HEIGHT);

    let avail_w = (i32::from(width) - i32::from(MARGIN_COLS)).max(min_w);
    let avail_h = (i32::from(height) - i32::from(MARGIN_ROWS)).max(min_h);

    let height_based_width = avail_h * RATIO_WIDTH / RATIO_HEIGHT;

    let (panel_w, panel_h) = if height_based_width <= avail_w {
        (height_based_width, avail_h)
    } else {
        (avail_w, avail_w * RATIO_HEIGHT / RATIO_WIDTH)
    };

    PanelGeometry {
        border_width: to_cells(panel_w.max(min_w)),
        border_height: to_cells(panel_h.max(min_h)),
    }
}

fn to_cells(value: i32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

impl PanelGeometry {
    /// Top-left cell `(x, y)` that centers the panel in `terminal`.
    pub fn origin(&self, terminal: TerminalGeometry) -> (u16, u16) {
        let x = terminal.width.saturating_sub(self.border_width) / 2;
        let y = terminal.height.saturating_sub(self.border_height) / 2;
        (x, y)
    }

    /// Image size and cursor cell for the inline screen image.
    ///
    /// The image is `IMAGE_PADDING` cells smaller than the panel in each
    /// dimension, starts on the second interior row, and is centered
    /// horizontally inside the border.
    pub fn image_placement(&self, terminal: TerminalGeometry) -> ImagePlacement {
        let (origin_x, origin_y) = self.origin(terminal);
        let cols = self.border_width.saturating_sub(IMAGE_PADDING);
        let rows = self.border_height.saturating_sub(IMAGE_PADDING);

        let inner_width = self.border_width.saturating_sub(2);
        let horizontal_offset = inner_width.saturating_sub(cols) / 2;

        ImagePlacement {
            row: origin_y.saturating_add(2),
            col: origin_x.saturating_add(1).saturating_add(horizontal_offset),
            cols,
            rows,
        }
    }

    /// Visual aspect ratio, counting a cell as twice as tall as it is wide.
    pub fn ratio(&self) -> f64 {
        f64::from(self.border_width) * 2.0 / f64::from(self.border_height)
    }
}
