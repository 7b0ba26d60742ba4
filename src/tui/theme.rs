//! Terminal theme detection and color definitions

use ratatui::style::Color;

/// Choropleth intensity level, relative to the busiest city on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MapLevel {
    None,
    Low,
    Medium,
    High,
    Max,
}

impl MapLevel {
    /// All levels in ascending order (legend order)
    pub const ALL: [MapLevel; 5] = [
        MapLevel::None,
        MapLevel::Low,
        MapLevel::Medium,
        MapLevel::High,
        MapLevel::Max,
    ];
}

/// Bucket an order count into quarters of the maximum.
/// Returns None for zero counts or when there is no maximum.
pub fn map_level(count: u64, max: u64) -> MapLevel {
    if count == 0 || max == 0 {
        return MapLevel::None;
    }
    let ratio = count as f64 / max as f64;
    if ratio <= 0.25 {
        MapLevel::Low
    } else if ratio <= 0.5 {
        MapLevel::Medium
    } else if ratio <= 0.75 {
        MapLevel::High
    } else {
        MapLevel::Max
    }
}

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Auto-detect terminal theme from background luminance.
    /// Must be called **before** entering raw mode (ratatui::init).
    /// Falls back to Dark if detection fails.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    /// Primary text color (headers, body text)
    pub fn text(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    /// Active/accent color (selected filters, keybinding keys)
    pub fn accent(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Secondary/muted text (separators, card titles, hints)
    pub fn muted(self) -> Color {
        match self {
            Self::Dark => Color::DarkGray,
            Self::Light => Color::Gray,
        }
    }

    /// Section header color
    pub fn header(self) -> Color {
        match self {
            Self::Dark => Color::Yellow,
            Self::Light => Color::Indexed(130), // dark orange/yellow (ANSI 256)
        }
    }

    /// Money values (revenue, ticket)
    pub fn money(self) -> Color {
        match self {
            Self::Dark => Color::Magenta,
            Self::Light => Color::Indexed(90), // dark magenta (ANSI 256)
        }
    }

    /// Bar/positive indicator color
    pub fn bar(self) -> Color {
        match self {
            Self::Dark => Color::Green,
            Self::Light => Color::Indexed(22), // dark green (ANSI 256)
        }
    }

    /// Error/warning indicator color
    pub fn error(self) -> Color {
        match self {
            Self::Dark => Color::Red,
            Self::Light => Color::Indexed(124), // dark red (ANSI 256)
        }
    }

    /// Purple-blue choropleth scale
    pub fn map_color(self, level: MapLevel) -> Color {
        match self {
            Self::Dark => match level {
                MapLevel::None => Color::Indexed(238),
                MapLevel::Low => Color::Indexed(60),
                MapLevel::Medium => Color::Indexed(67),
                MapLevel::High => Color::Indexed(74),
                MapLevel::Max => Color::Indexed(117),
            },
            Self::Light => match level {
                MapLevel::None => Color::Indexed(252),
                MapLevel::Low => Color::Indexed(146),
                MapLevel::Medium => Color::Indexed(110),
                MapLevel::High => Color::Indexed(68),
                MapLevel::Max => Color::Indexed(25),
            },
        }
    }
}
