use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
};

use super::FloatingPanel;
use crate::app::{App, ScanStatus};
use routetui::cases::{Badge, CaseAnalysis, ColorToken, EscalationTier, visit_frequencies};
use routetui::config::ThemeConfig;

/// Render the floating Transfer Route panel. Returns where it was drawn.
pub fn render_panel(f: &mut Frame, area: Rect, app: &App) -> Rect {
    let theme = &app.config.theme;
    let layout = &app.config.layout;
    let analysis = app.panel.last_report.as_ref().and_then(|r| r.analysis());

    let title = header(app, analysis, theme);
    let body = (!app.panel.minimized).then(|| body_lines(app, analysis, theme));
    let (width, height) = match &body {
        Some(lines) => (
            layout.panel_width,
            (lines.len() as u16 + 2).min(layout.panel_max_height),
        ),
        None => (title.width() as u16 + 8, 2),
    };
    let rect = FloatingPanel::rect(width, height, area, app.panel.position);

    f.render_widget(Clear, rect);
    let block = FloatingPanel::new(title, theme).block(app.panel.minimized);
    match body {
        Some(lines) => {
            let paragraph = Paragraph::new(lines)
                .block(block)
                .style(Style::default().fg(theme.fg()).bg(theme.bg_element()))
                .wrap(Wrap { trim: false })
                .scroll((app.panel.scroll, 0));
            f.render_widget(paragraph, rect);
        }
        None => f.render_widget(block, rect),
    }
    rect
}

fn header<'a>(app: &App, analysis: Option<&CaseAnalysis>, theme: &ThemeConfig) -> Line<'a> {
    let mut spans = vec![Span::styled(
        "📋 Transfer Route ",
        Style::default().fg(theme.fg()).add_modifier(Modifier::BOLD),
    )];

    let badge = match (&app.scan_status, analysis) {
        (ScanStatus::NoCase, _) => Some(Badge::no_case()),
        (ScanStatus::Complete { .. }, Some(analysis)) => Some(analysis.escalation.badge()),
        _ => None,
    };
    if let Some(badge) = badge {
        spans.push(Span::styled(
            format!(" {} ", badge.label),
            Style::default()
                .fg(Color::White)
                .bg(theme.token(badge.color))
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn status_line(status: &ScanStatus, theme: &ThemeConfig) -> Line<'static> {
    let (text, color) = match status {
        ScanStatus::Loading => ("Loading...".to_string(), theme.fg_muted()),
        ScanStatus::NoTask => ("No task ID found in URL".to_string(), theme.fg_muted()),
        ScanStatus::Scanning => ("⏳ Reading messages...".to_string(), theme.fg_muted()),
        ScanStatus::NoCase => (
            "⚠️ No case ID found (signal task?)".to_string(),
            theme.token(ColorToken::High),
        ),
        ScanStatus::Complete {
            case_id,
            transfer_count,
        } => {
            let token = match *transfer_count {
                c if c > 3 => ColorToken::Critical,
                c if c > 2 => ColorToken::High,
                _ => ColorToken::Clear,
            };
            (
                format!("✅ Case {} — {} transfers", case_id, transfer_count),
                theme.token(token),
            )
        }
    };
    Line::from(Span::styled(text, Style::default().fg(color))).centered()
}

fn body_lines(app: &App, analysis: Option<&CaseAnalysis>, theme: &ThemeConfig) -> Vec<Line<'static>> {
    let mut lines = vec![status_line(&app.scan_status, theme)];

    let Some(analysis) = analysis.filter(|_| matches!(app.scan_status, ScanStatus::Complete { .. }))
    else {
        return lines;
    };
    lines.push(Line::raw(""));

    let escalation = &analysis.escalation;
    let suffix = match escalation.tier {
        EscalationTier::Normal => String::new(),
        tier => format!(" {} {}", tier.icon(), tier.label()),
    };
    lines.push(
        Line::from(Span::styled(
            format!(" Total Transfers: {}{} ", analysis.transfer_count, suffix),
            Style::default()
                .fg(Color::White)
                .bg(theme.token(escalation.tier.color()))
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
    );

    if analysis.flow.is_empty() {
        lines.push(Line::raw(""));
        lines.push(
            Line::from(Span::styled(
                "No transfer emails found",
                Style::default().fg(theme.fg_muted()),
            ))
            .centered(),
        );
        return lines;
    }

    lines.push(
        Line::from(vec![
            Span::raw("📍 Currently in: "),
            Span::styled(
                escalation.current_queue_label.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])
        .centered(),
    );

    if analysis.transfer_count > 2 {
        lines.push(Line::raw(""));
        lines.extend(history_lines(analysis, theme));
    }

    lines.push(Line::raw(""));
    lines.extend(flow_lines(analysis, theme));
    lines
}

/// Queue visit counts, the "don't send it back there" list
fn history_lines(analysis: &CaseAnalysis, theme: &ThemeConfig) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "📊 Queue Visit History, avoid re-transferring to:",
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    for visits in visit_frequencies(&analysis.flow) {
        let line = if visits.is_current {
            Line::from(Span::styled(
                format!("  📍 {} (CURRENT, {}×)", visits.label, visits.visits),
                Style::default()
                    .fg(theme.current())
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(
                format!("  ⛔ {}, {}×", visits.label, visits.visits),
                Style::default().fg(theme.token(ColorToken::Critical)),
            ))
        };
        lines.push(line);
    }
    lines
}

fn flow_lines(analysis: &CaseAnalysis, theme: &ThemeConfig) -> Vec<Line<'static>> {
    let accent = theme.token(ColorToken::Active);
    let mut lines = vec![Line::from(Span::styled(
        "📋 Transfer Flow (Oldest → Newest)",
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    ))];

    let last = analysis.flow.len() - 1;
    for (i, entry) in analysis.flow.iter().enumerate() {
        let is_last = i == last;
        let marker = if is_last { " 📍 (Current)" } else { "" };
        let bar = Style::default().fg(if is_last { theme.current() } else { accent });

        lines.push(Line::from(vec![
            Span::styled("┃ ", bar),
            Span::styled(
                format!("#{}{}", i + 1, marker),
                Style::default().fg(theme.fg_muted()),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("┃ ", bar),
            Span::styled(entry.label.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("┃ ", bar),
            Span::styled(entry.queue_id.clone(), Style::default().fg(theme.fg_muted())),
        ]));
        if !is_last {
            lines.push(Line::from(Span::styled("↓", Style::default().fg(accent))).centered());
        }
    }
    lines
}
