//! Help popup widget - displays keyboard shortcuts

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width and height of the help popup
const POPUP_WIDTH: u16 = 44;
const POPUP_HEIGHT: u16 = 15;

/// Help popup widget showing keyboard shortcuts
pub struct HelpPopup {
    theme: Theme,
}

impl HelpPopup {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Calculate centered popup area
    pub fn centered_area(area: Rect) -> Rect {
        let x = area.x + (area.width.saturating_sub(POPUP_WIDTH)) / 2;
        let y = area.y + (area.height.saturating_sub(POPUP_HEIGHT)) / 2;
        Rect {
            x,
            y,
            width: POPUP_WIDTH.min(area.width),
            height: POPUP_HEIGHT.min(area.height),
        }
    }

    fn render_section_header(&self, area: Rect, buf: &mut Buffer, title: &str) {
        Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(self.theme.header())
                .add_modifier(Modifier::BOLD),
        )]))
        .render(area, buf);
    }

    fn render_separator(&self, area: Rect, buf: &mut Buffer) {
        buf.set_string(
            area.x,
            area.y,
            "─".repeat(area.width as usize),
            Style::default().fg(self.theme.muted()),
        );
    }
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Widget for HelpPopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear the area first (for overlay effect)
        Clear.render(area, buf);

        let title = format!(" olistdash v{} ", VERSION);
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Length(1), // [0] Padding
            Constraint::Length(1), // [1] Filters header
            Constraint::Length(1), // [2] Separator
            Constraint::Length(1), // [3] Year
            Constraint::Length(1), // [4] Category
            Constraint::Length(1), // [5] Category jump
            Constraint::Length(1), // [6] Padding
            Constraint::Length(1), // [7] General header
            Constraint::Length(1), // [8] Separator
            Constraint::Length(1), // [9] q/Esc
            Constraint::Length(1), // [10] ?
            Constraint::Length(1), // [11] Close hint
            Constraint::Min(0),
        ])
        .split(inner);

        self.render_section_header(chunks[1], buf, "Filters");
        self.render_separator(chunks[2], buf);
        render_keybinding(chunks[3], buf, "←/→ or h/l", "Previous/next year", self.theme);
        render_keybinding(chunks[4], buf, "↑/↓ or k/j", "Previous/next category", self.theme);
        render_keybinding(chunks[5], buf, "PgUp/PgDn", "Jump 10 categories", self.theme);

        self.render_section_header(chunks[7], buf, "General");
        self.render_separator(chunks[8], buf);
        render_keybinding(chunks[9], buf, "q / Esc", "Quit", self.theme);
        render_keybinding(chunks[10], buf, "?", "Toggle help", self.theme);

        Paragraph::new(Line::from(vec![Span::styled(
            "Press ? to close",
            Style::default().fg(self.theme.muted()),
        )]))
        .alignment(Alignment::Center)
        .render(chunks[11], buf);
    }
}

/// Render a single keybinding line
fn render_keybinding(area: Rect, buf: &mut Buffer, key: &str, desc: &str, theme: Theme) {
    let line = Line::from(vec![
        Span::styled(format!("  {:<14}", key), Style::default().fg(theme.accent())),
        Span::styled(desc, Style::default().fg(theme.text())),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Left)
        .render(area, buf);
}
