//! Summary cards: revenue, orders, average ticket, approval rate

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::tui::theme::Theme;
use crate::types::SummaryCards;

/// Card height: border + value + title + border
pub const CARDS_HEIGHT: u16 = 4;

/// Row of four summary cards
pub struct Cards<'a> {
    cards: &'a SummaryCards,
    theme: Theme,
}

impl<'a> Cards<'a> {
    pub fn new(cards: &'a SummaryCards, theme: Theme) -> Self {
        Self { cards, theme }
    }

    /// (value, title, value color) per card, left to right
    fn entries(&self) -> [(&'a str, &'static str, Color); 4] {
        [
            (
                self.cards.revenue.as_str(),
                "REVENUE - BRL",
                self.theme.money(),
            ),
            (
                self.cards.total_orders.as_str(),
                "TOTAL ORDERS",
                self.theme.text(),
            ),
            (
                self.cards.avg_ticket.as_str(),
                "AVG TICKET PER ORDER - BRL",
                self.theme.money(),
            ),
            (
                self.cards.approval_rate.as_str(),
                "TRANSACTION APPROVAL RATE",
                self.theme.bar(),
            ),
        ]
    }
}

impl Widget for Cards<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let columns = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);

        for ((value, title, color), column) in self.entries().into_iter().zip(columns.iter()) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.muted()));
            let inner = block.inner(*column);
            block.render(*column, buf);

            let lines = vec![
                Line::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Line::styled(
                    title,
                    Style::default()
                        .fg(self.theme.muted())
                        .add_modifier(Modifier::BOLD),
                ),
            ];
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .render(inner, buf);
        }
    }
}
