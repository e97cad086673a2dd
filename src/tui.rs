use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::fmt::money;
use crate::models::Category;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const AMOUNT_STYLE: Style = Style::new().fg(Color::Rgb(240, 120, 100));

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const FADED_STYLE: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::DIM);

pub const DELETE_STYLE: Style = Style::new()
    .fg(Color::White)
    .bg(Color::Red)
    .add_modifier(Modifier::BOLD);

pub fn category_color(category: Category) -> Color {
    match category {
        Category::Food => Color::Rgb(255, 159, 67),
        Category::Transport => Color::Rgb(84, 160, 255),
        Category::Shopping => Color::Rgb(255, 107, 129),
        Category::Entertainment => Color::Rgb(165, 94, 234),
        Category::Home => Color::Rgb(38, 222, 129),
        Category::Medical => Color::Rgb(252, 92, 101),
        Category::Education => Color::Rgb(69, 170, 242),
        Category::Transfer => Color::Rgb(209, 216, 224),
        Category::Other => Color::Gray,
    }
}

pub fn money_span(symbol: &str, amount: f64) -> Span<'static> {
    Span::styled(money(symbol, amount), AMOUNT_STYLE)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

/// A `width` x `height` rectangle centered in `area`, clipped to it.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_counts_lines() {
        let (wrapped, lines) = wrap_text("one two three four", 9);
        assert_eq!(lines, 3);
        assert!(wrapped.contains('\n'));
        assert_eq!(wrap_text("anything", 0).1, 1);
    }

    #[test]
    fn test_centered_is_clipped() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered(area, 20, 4);
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (10, 3, 20, 4));
        let big = centered(area, 100, 100);
        assert_eq!((big.width, big.height), (40, 10));
    }
}
