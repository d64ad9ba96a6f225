use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::View;
use routetui::config::ThemeConfig;

pub fn render_help(
    f: &mut Frame,
    area: Rect,
    view: View,
    status: Option<&str>,
    url_input: Option<&str>,
    theme: &ThemeConfig,
) {
    let key_style = Style::default().fg(theme.primary());
    let text_style = Style::default().fg(theme.fg_muted());
    let input_style = Style::default().fg(theme.fg());

    let help_text = match view {
        View::Navigate => vec![
            Span::styled("url", key_style),
            Span::raw(" "),
            Span::styled(url_input.unwrap_or(""), input_style),
            Span::styled("_", key_style),
            Span::styled("  ", text_style),
            Span::styled("Enter", key_style),
            Span::styled(" open  ", text_style),
            Span::styled("Esc", key_style),
            Span::styled(" cancel", text_style),
        ],
        View::Panel => vec![
            Span::styled("g", key_style),
            Span::styled(" open task  ", text_style),
            Span::styled("r", key_style),
            Span::styled(" rescan  ", text_style),
            Span::styled("m", key_style),
            Span::styled(" minimize  ", text_style),
            Span::styled("j/k", key_style),
            Span::styled(" scroll  ", text_style),
            Span::styled("w", key_style),
            Span::styled(" warning  ", text_style),
            Span::styled("x", key_style),
            Span::styled(" close case  ", text_style),
            Span::styled("q", key_style),
            Span::styled(" quit", text_style),
        ],
        View::Warning => vec![
            Span::styled("Enter/Esc", key_style),
            Span::styled(" got it  ", text_style),
            Span::styled("q", key_style),
            Span::styled(" quit", text_style),
        ],
    };

    let mut line = Line::from(help_text);

    // Add status message if present
    if let Some(msg) = status {
        line.spans
            .push(Span::styled("  │  ", Style::default().fg(theme.border())));
        line.spans
            .push(Span::styled(msg, Style::default().fg(theme.primary())));
    }

    let paragraph = Paragraph::new(line).style(Style::default().bg(theme.bg_panel()));

    f.render_widget(paragraph, area);
}
