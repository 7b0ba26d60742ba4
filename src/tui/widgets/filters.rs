//! Filter bar widget: year selector and category selector

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::tui::theme::Theme;

/// Current filter selection and its options
pub struct FilterBar<'a> {
    years: &'a [i32],
    selected_year: i32,
    category: &'a str,
    category_position: (usize, usize),
    theme: Theme,
}

impl<'a> FilterBar<'a> {
    /// `category_position` is (1-based index, total)
    pub fn new(
        years: &'a [i32],
        selected_year: i32,
        category: &'a str,
        category_position: (usize, usize),
        theme: Theme,
    ) -> Self {
        Self {
            years,
            selected_year,
            category,
            category_position,
            theme,
        }
    }

    fn line(&self) -> Line<'a> {
        let label = Style::default()
            .fg(self.theme.header())
            .add_modifier(Modifier::BOLD);
        let mut spans = vec![Span::styled("YEAR ", label)];

        for year in self.years {
            if *year == self.selected_year {
                spans.push(Span::styled(
                    format!("[{}]", year),
                    Style::default()
                        .fg(self.theme.accent())
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::styled(
                    format!(" {} ", year),
                    Style::default().fg(self.theme.muted()),
                ));
            }
        }

        let (index, total) = self.category_position;
        spans.extend([
            Span::raw("    "),
            Span::styled("CATEGORY ", label),
            Span::styled("◀ ", Style::default().fg(self.theme.muted())),
            Span::styled(
                self.category,
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ▶", Style::default().fg(self.theme.muted())),
            Span::styled(
                format!("  ({}/{})", index, total),
                Style::default().fg(self.theme.muted()),
            ),
        ]);

        Line::from(spans)
    }
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let line = self.line();
        let x = area.x + area.width.saturating_sub(line.width() as u16) / 2;
        buf.set_line(x, area.y, &line, area.width.saturating_sub(x - area.x));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(bar: FilterBar) -> String {
        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_selected_year_is_bracketed() {
        let years = [2016, 2017, 2018];
        let text = rendered(FilterBar::new(&years, 2017, "pet_shop", (3, 10), Theme::Dark));

        assert!(text.contains("[2017]"));
        assert!(text.contains(" 2016 "));
        assert!(!text.contains("[2016]"));
    }

    #[test]
    fn test_category_and_position_shown() {
        let years = [2016, 2017, 2018];
        let text = rendered(FilterBar::new(&years, 2018, "pet_shop", (3, 10), Theme::Dark));

        assert!(text.contains("pet_shop"));
        assert!(text.contains("(3/10)"));
    }
}
