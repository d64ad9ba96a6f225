use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders},
};

use routetui::config::ThemeConfig;

/// The floating Transfer Route panel's frame
pub struct FloatingPanel<'a> {
    title: Line<'a>,
    theme: &'a ThemeConfig,
}

impl<'a> FloatingPanel<'a> {
    pub fn new(title: Line<'a>, theme: &'a ThemeConfig) -> Self {
        Self { title, theme }
    }

    /// Panel rect: at `position` if dragged, otherwise anchored bottom-right,
    /// always kept inside `area`
    pub fn rect(width: u16, height: u16, area: Rect, position: Option<(u16, u16)>) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        let max_x = area.x + area.width - width;
        let max_y = area.y + area.height - height;
        let (x, y) = match position {
            Some((x, y)) => (x.clamp(area.x, max_x), y.clamp(area.y, max_y)),
            None => (max_x.saturating_sub(1).max(area.x), max_y),
        };
        Rect::new(x, y, width, height)
    }

    /// Get the styled block for this panel, with a minimize/expand marker
    pub fn block(self, minimized: bool) -> Block<'a> {
        let toggle = if minimized { "[□]" } else { "[—]" };
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_active()))
            .title(self.title)
            .title(Line::from(toggle).alignment(Alignment::Right))
            .style(Style::default().bg(self.theme.bg_panel()))
    }
}

/// A centered modal dialog
pub struct Modal<'a> {
    title: Line<'a>,
    theme: &'a ThemeConfig,
}

impl<'a> Modal<'a> {
    pub fn new(title: impl Into<Line<'a>>, theme: &'a ThemeConfig) -> Self {
        Self {
            title: title.into(),
            theme,
        }
    }

    /// Calculate centered rect for the modal
    pub fn centered_rect(&self, width: u16, height: u16, area: Rect) -> Rect {
        let modal_width = width.min(area.width.saturating_sub(4));
        let modal_height = height.min(area.height.saturating_sub(4));
        let x = (area.width.saturating_sub(modal_width)) / 2 + area.x;
        let y = (area.height.saturating_sub(modal_height)) / 2 + area.y;
        Rect::new(x, y, modal_width, modal_height)
    }

    /// Get the styled block for this modal
    pub fn block(&self, border: ratatui::style::Color) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(self.title.clone())
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(self.theme.bg_panel()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_anchored_bottom_right() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(FloatingPanel::rect(30, 10, area, None), Rect::new(69, 30, 30, 10));
    }

    #[test]
    fn test_panel_position_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(
            FloatingPanel::rect(30, 10, area, Some((90, 35))),
            Rect::new(70, 30, 30, 10)
        );
        assert_eq!(
            FloatingPanel::rect(30, 10, area, Some((5, 2))),
            Rect::new(5, 2, 30, 10)
        );
    }

    #[test]
    fn test_panel_larger_than_screen() {
        let area = Rect::new(0, 0, 20, 5);
        assert_eq!(FloatingPanel::rect(30, 10, area, None), Rect::new(0, 0, 20, 5));
    }
}
