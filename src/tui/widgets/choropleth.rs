//! Choropleth map widget - city outlines shaded by order count

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders, Widget,
    },
};

use crate::services::boundaries::{Boundaries, Bounds};
use crate::tui::theme::{map_level, MapLevel, Theme};
use crate::types::{CustomerLocation, UNMATCHED_CITY_ID};

/// Fraction of the data extent added around the map
const MAP_PADDING: f64 = 0.05;

/// One city ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Shade<'a> {
    pub city_id: &'a str,
    pub level: MapLevel,
}

/// Assign a level to every mappable row, dimmest first so bright outlines land on top
pub fn shades(rows: &[CustomerLocation]) -> Vec<Shade<'_>> {
    let max = rows.iter().map(|r| r.order_count).max().unwrap_or(0);
    let mut shades: Vec<Shade> = rows
        .iter()
        .filter(|r| r.city_id != UNMATCHED_CITY_ID)
        .map(|r| Shade {
            city_id: r.city_id.as_str(),
            level: map_level(r.order_count, max),
        })
        .collect();
    shades.sort_by_key(|s| s.level);
    shades
}

/// Choropleth over the city boundaries
pub struct Choropleth<'a> {
    rows: &'a [CustomerLocation],
    boundaries: Option<&'a Boundaries>,
    theme: Theme,
}

impl<'a> Choropleth<'a> {
    pub fn new(
        rows: &'a [CustomerLocation],
        boundaries: Option<&'a Boundaries>,
        theme: Theme,
    ) -> Self {
        Self {
            rows,
            boundaries,
            theme,
        }
    }

    fn render_message(&self, area: Rect, buf: &mut Buffer, message: &str) {
        let x = area.x + area.width.saturating_sub(message.chars().count() as u16) / 2;
        let y = area.y + area.height / 2;
        buf.set_string(x, y, message, Style::default().fg(self.theme.muted()));
    }

    fn render_legend(&self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled("ORDERS  less ", Style::default().fg(self.theme.muted()))];
        for level in &MapLevel::ALL[1..] {
            spans.push(Span::styled(
                "██",
                Style::default().fg(self.theme.map_color(*level)),
            ));
        }
        spans.push(Span::styled(" more", Style::default().fg(self.theme.muted())));
        let line = Line::from(spans);
        let x = area.x + area.width.saturating_sub(line.width() as u16);
        buf.set_line(x, area.y, &line, area.width);
    }
}

impl Widget for Choropleth<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" CUSTOMER ORDERS BY CITY ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.muted()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 10 || inner.height < 3 {
            return;
        }

        let Some(boundaries) = self.boundaries else {
            self.render_message(inner, buf, "Map disabled");
            return;
        };

        let shaded = shades(self.rows);
        let Some(bounds) = boundaries.bounds(shaded.iter().map(|s| s.city_id)) else {
            self.render_message(inner, buf, "No mapped cities for this selection");
            return;
        };
        let Bounds {
            min_lng,
            max_lng,
            min_lat,
            max_lat,
        } = bounds.padded(MAP_PADDING);

        let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        let theme = self.theme;

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([min_lng, max_lng])
            .y_bounds([min_lat, max_lat])
            .paint(|ctx| {
                for shade in &shaded {
                    let Some(region) = boundaries.get(shade.city_id) else {
                        continue;
                    };
                    let color = theme.map_color(shade.level);
                    for ring in &region.rings {
                        match ring.as_slice() {
                            [] => {}
                            [single] => ctx.draw(&Points {
                                coords: &[*single],
                                color,
                            }),
                            _ => {
                                for pair in ring.windows(2) {
                                    ctx.draw(&CanvasLine::new(
                                        pair[0].0, pair[0].1, pair[1].0, pair[1].1, color,
                                    ));
                                }
                            }
                        }
                    }
                }
            })
            .render(chunks[0], buf);

        self.render_legend(chunks[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::boundaries::Region;
    use std::collections::HashMap;

    fn row(city_id: &str, count: u64) -> CustomerLocation {
        CustomerLocation {
            city_id: city_id.into(),
            city_name: format!("city {}", city_id),
            purchase_year: 2017,
            category: "X".into(),
            order_count: count,
        }
    }

    fn square(x: f64, y: f64) -> Region {
        Region {
            name: "sq".into(),
            rings: vec![vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y)]],
        }
    }

    fn render_to_text(widget: Choropleth) -> String {
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_shades_skip_unmatched_and_sort_ascending() {
        let rows = vec![row("1", 100), row("0", 180), row("2", 10)];

        let s = shades(&rows);

        assert_eq!(s.len(), 2);
        assert_eq!(s[0].city_id, "2");
        assert_eq!(s[1].city_id, "1");
        // The unmatched city still sets the scale maximum
        assert_eq!(s[1].level, MapLevel::High);
    }

    #[test]
    fn test_render_disabled_map() {
        let rows = vec![row("1", 1)];
        let text = render_to_text(Choropleth::new(&rows, None, Theme::Dark));
        assert!(text.contains("Map disabled"));
    }

    #[test]
    fn test_render_no_mapped_cities() {
        let boundaries = Boundaries::new(HashMap::new());
        let rows = vec![row("1", 1)];
        let text = render_to_text(Choropleth::new(&rows, Some(&boundaries), Theme::Dark));
        assert!(text.contains("No mapped cities for this selection"));
    }

    #[test]
    fn test_render_draws_outlines_and_legend() {
        let mut regions = HashMap::new();
        regions.insert("1".to_string(), square(0.0, 0.0));
        regions.insert("2".to_string(), square(3.0, 3.0));
        let boundaries = Boundaries::new(regions);
        let rows = vec![row("1", 10), row("2", 2)];

        let text = render_to_text(Choropleth::new(&rows, Some(&boundaries), Theme::Dark));

        assert!(text.contains("ORDERS  less"));
        // Braille cells are in U+2800..U+28FF
        assert!(text.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
    }
}
