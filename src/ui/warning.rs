use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
};

use super::Modal;
use routetui::cases::{CaseAnalysis, ColorToken};
use routetui::config::ThemeConfig;

/// Render the tiered escalation warning over everything else
pub fn render_warning(
    f: &mut Frame,
    area: Rect,
    analysis: &CaseAnalysis,
    width: u16,
    theme: &ThemeConfig,
) {
    let escalation = &analysis.escalation;
    let Some(guidance) = &escalation.guidance else {
        return;
    };
    let tier_color = theme.token(escalation.tier.color());
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(theme.fg_muted());

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}: {}", escalation.tier.label(), guidance.headline),
            bold.fg(tier_color),
        ))
        .centered(),
        Line::from(vec![
            Span::raw("This case has been transferred "),
            Span::styled(format!("{} times", analysis.transfer_count), bold),
            Span::raw("."),
        ])
        .centered(),
        Line::from(vec![
            Span::styled("📍 Currently in: ", muted),
            Span::styled(
                escalation.current_queue_label.clone(),
                bold.fg(theme.token(ColorToken::Active)),
            ),
        ])
        .centered(),
        Line::raw(""),
        Line::from(Span::styled(
            format!("{} {}", escalation.tier.icon(), guidance.action),
            bold.fg(tier_color),
        )),
    ];

    for step in &guidance.steps {
        lines.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(tier_color)),
            Span::raw(step.clone()),
        ]));
    }
    if let Some(destination) = &guidance.recommended_destination {
        lines.push(Line::from(vec![
            Span::styled("  → ", Style::default().fg(tier_color)),
            Span::styled(destination.clone(), bold.fg(theme.current())),
        ]));
    }
    if let Some(url) = &guidance.policy_url {
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("Transfer Guidelines SOP: ", muted),
            Span::styled(
                url.clone(),
                Style::default()
                    .fg(theme.current())
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]));
    }
    if let Some(note) = guidance.handoff_note {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("Transfer note:", muted)));
        lines.push(Line::from(Span::styled(note, Style::default().fg(theme.fg()))));
    }

    lines.push(Line::raw(""));
    lines.push(
        Line::from(Span::styled(
            format!("⚠️ {}", guidance.audit_notice),
            Style::default().fg(theme.token(ColorToken::Critical)),
        ))
        .centered(),
    );
    lines.push(
        Line::from(Span::styled(
            "📊 Full transfer history is in the Transfer Route panel.",
            muted,
        ))
        .centered(),
    );
    lines.push(Line::raw(""));
    lines.push(
        Line::from(Span::styled(
            "  Got It  ",
            bold.fg(Color::White).bg(tier_color),
        ))
        .centered(),
    );

    let modal = Modal::new(format!(" {} Transfer Warning ", escalation.tier.icon()), theme);
    let inner_width = width.saturating_sub(2).max(1) as usize;
    let wrapped_rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(inner_width).max(1))
        .sum();
    let modal_area = modal.centered_rect(width, wrapped_rows as u16 + 2, area);

    f.render_widget(Clear, modal_area);
    let paragraph = Paragraph::new(lines)
        .block(modal.block(tier_color))
        .style(Style::default().fg(theme.fg()))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, modal_area);
}
