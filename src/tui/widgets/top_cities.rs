//! Top cities table widget - ranked by distinct orders

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::services::display_city_name;
use crate::services::format::format_number;
use crate::tui::theme::Theme;
use crate::types::TopCity;

/// Width of the ORDERS column
const ORDERS_WIDTH: usize = 8;

/// Format a percentage bar with filled/empty blocks
/// Example: 50.0% with width 10 → "█████░░░░░"
pub fn format_percentage_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let empty = width - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Truncate to `max` chars with an ellipsis (UTF-8 safe)
fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        format!("{}…", name.chars().take(max.saturating_sub(1)).collect::<String>())
    } else {
        name.to_string()
    }
}

/// CITY / ORDERS ranking
pub struct TopCitiesTable<'a> {
    cities: &'a [TopCity],
    theme: Theme,
}

impl<'a> TopCitiesTable<'a> {
    pub fn new(cities: &'a [TopCity], theme: Theme) -> Self {
        Self { cities, theme }
    }
}

impl Widget for TopCitiesTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" TOP CITIES ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.muted()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 12 || inner.height < 2 {
            return;
        }

        let chunks = Layout::vertical([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Separator
            Constraint::Min(0),    // Rows
        ])
        .split(inner);

        let width = inner.width as usize;
        // Bar gets whatever the name and count leave, capped
        let bar_width = width.saturating_sub(ORDERS_WIDTH + 18).min(12);
        let city_width = width.saturating_sub(ORDERS_WIDTH + bar_width + 2);

        let header_style = Style::default()
            .fg(self.theme.muted())
            .add_modifier(Modifier::BOLD);
        let header = Line::from(vec![
            Span::styled(format!("{:<city_width$}", "CITY"), header_style),
            Span::styled(format!("{:>ORDERS_WIDTH$}", "ORDERS"), header_style),
        ]);
        buf.set_line(chunks[0].x, chunks[0].y, &header, chunks[0].width);

        buf.set_string(
            chunks[1].x,
            chunks[1].y,
            "─".repeat(width),
            Style::default().fg(self.theme.muted()),
        );

        if self.cities.is_empty() {
            buf.set_string(
                chunks[2].x,
                chunks[2].y,
                "No orders for this selection",
                Style::default().fg(self.theme.muted()),
            );
            return;
        }

        let max = self.cities.iter().map(|c| c.orders).max().unwrap_or(0);
        for (i, city) in self
            .cities
            .iter()
            .take(chunks[2].height as usize)
            .enumerate()
        {
            let percent = if max > 0 {
                city.orders as f64 / max as f64 * 100.0
            } else {
                0.0
            };
            let name = truncate(&display_city_name(&city.city), city_width.saturating_sub(1));
            let row = Line::from(vec![
                Span::styled(
                    format!("{:<city_width$}", name),
                    Style::default()
                        .fg(self.theme.text())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:>ORDERS_WIDTH$}", format_number(city.orders)),
                    Style::default().fg(self.theme.accent()),
                ),
                Span::raw("  "),
                Span::styled(
                    format_percentage_bar(percent, bar_width),
                    Style::default().fg(self.theme.bar()),
                ),
            ]);
            buf.set_line(chunks[2].x, chunks[2].y + i as u16, &row, chunks[2].width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percentage_bar() {
        assert_eq!(format_percentage_bar(50.0, 10), "█████░░░░░");
        assert_eq!(format_percentage_bar(0.0, 4), "░░░░");
        assert_eq!(format_percentage_bar(100.0, 4), "████");
        assert_eq!(format_percentage_bar(150.0, 4), "████");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("santos", 10), "santos");
        assert_eq!(truncate("sao jose dos campos", 8), "sao jos…");
    }

    #[test]
    fn test_renders_rows_in_order() {
        let cities = vec![
            TopCity {
                city: "sao paulo".into(),
                orders: 1500,
            },
            TopCity {
                city: "campinas".into(),
                orders: 20,
            },
        ];
        let area = Rect::new(0, 0, 50, 8);
        let mut buf = Buffer::empty(area);
        TopCitiesTable::new(&cities, Theme::Dark).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        let sp = text.find("Sao Paulo").unwrap();
        let camp = text.find("Campinas").unwrap();
        assert!(sp < camp);
        assert!(text.contains("1,500"));
    }

    #[test]
    fn test_renders_empty_message() {
        let area = Rect::new(0, 0, 50, 8);
        let mut buf = Buffer::empty(area);
        TopCitiesTable::new(&[], Theme::Dark).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("No orders for this selection"));
    }
}
