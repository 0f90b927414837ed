use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, InputMode, ProfileTab, Screen};
use crate::session::{ChatMessage, ChatRole};
use crate::wallet::truncate_address;

/// Segment message text on line breaks, one visual line per segment.
fn message_lines(text: &str) -> Vec<Line<'_>> {
    text.split('\n').map(Line::from).collect()
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Home => render_home(app, frame, body_area),
        Screen::Diagnose => render_diagnose(app, frame, body_area),
        Screen::Report => render_report(app, frame, body_area),
        Screen::Profile => render_profile(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        " MediChain AI ",
        Style::default().fg(Color::Cyan).bold(),
    )];

    let tabs = [
        ("1", "Home", Screen::Home),
        ("2", "Diagnose", Screen::Diagnose),
        ("3", "Report", Screen::Report),
        ("4", "Profile", Screen::Profile),
    ];
    for (key, label, screen) in tabs {
        let style = if app.screen == screen {
            Style::default().bg(Color::Cyan).fg(Color::Black).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {}:{} ", key, label), style));
    }

    spans.push(Span::raw(" "));
    spans.push(match &app.wallet_account {
        Some(address) => Span::styled(
            format!(" {} ", truncate_address(address)),
            Style::default().fg(Color::Green).bold(),
        ),
        None => Span::styled(" w:Connect Wallet ", Style::default().fg(Color::Gray)),
    });

    spans.push(Span::styled(
        format!(" v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Home => " HOME ",
        Screen::Diagnose => " DIAGNOSE ",
        Screen::Report => " REPORT ",
        Screen::Profile => " PROFILE ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.screen, app.input_mode) {
        (Screen::Home, _) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" get diagnosed ", label_style),
            Span::styled(" 1-4 ", key_style),
            Span::styled(" screens ", label_style),
            Span::styled(" w ", key_style),
            Span::styled(" wallet ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (Screen::Diagnose, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
        (Screen::Diagnose, InputMode::Normal) => vec![
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" g/G ", key_style),
            Span::styled(" top/bottom ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" home ", label_style),
        ],
        (Screen::Report, _) => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" select ", label_style),
            Span::styled(" 1-4 ", key_style),
            Span::styled(" screens ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (Screen::Profile, _) => vec![
            Span::styled(" Tab/h/l ", key_style),
            Span::styled(" tabs ", label_style),
            Span::styled(" w ", key_style),
            Span::styled(" wallet ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_home(app: &App, frame: &mut Frame, area: Rect) {
    let [_, hero_area, _] = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(8),
        Constraint::Min(0),
    ])
    .areas(area);

    let mut lines = vec![
        Line::from(Span::styled(
            "AI-Powered Health Diagnosis",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("Get quick, accurate disease predictions with medicine recommendations."),
        Line::from("Your data is protected with blockchain."),
        Line::default(),
        Line::from(Span::styled(
            " Press Enter to get diagnosed ",
            Style::default().bg(Color::Blue).fg(Color::White).bold(),
        )),
    ];

    if let Some(notice) = &app.wallet_notice {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let hero = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(hero, hero_area);
}

fn render_diagnose(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Inner size for scroll calculations (minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Health Chatbot ");

    let chat_text = if app.session.messages().is_empty() {
        Text::from(Span::styled(
            "Describe your symptoms to get started.",
            Style::default().fg(Color::DarkGray).italic(),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for msg in app.session.messages() {
            lines.extend(chat_message_lines(msg, app.animation_frame));
            lines.push(Line::default());
        }
        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    render_chat_input(app, frame, input_area);
}

fn chat_message_lines(msg: &ChatMessage, animation_frame: u8) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    match msg.role {
        ChatRole::User => {
            lines.push(Line::from(Span::styled(
                "You:",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            lines.extend(message_lines(&msg.text));
        }
        ChatRole::Assistant => {
            lines.push(Line::from(Span::styled(
                "Dr. Bot:",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            if msg.pending {
                // Animated ellipsis over the placeholder text
                let dots = ".".repeat((animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    format!("{}{}", msg.text.trim_end_matches('.'), dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            } else {
                lines.extend(message_lines(&msg.text));
            }
        }
    }
    lines
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let in_flight = app.session.in_flight();

    let (title, border_color) = if in_flight {
        (" Sending... ", Color::DarkGray)
    } else if app.input_mode == InputMode::Editing {
        (" Describe your symptoms (Enter to send) ", Color::Yellow)
    } else {
        (" Describe your symptoms (i to type) ", Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible in a narrow input
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.session.draft_cursor();
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .session
        .draft()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing && !in_flight {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_report(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Diagnosis Reports ({}) ", app.reports.len()));

    if app.reports.is_empty() {
        let placeholder = Paragraph::new(
            "No diagnosis reports yet.\nRun a diagnosis from the Diagnose screen (2).",
        )
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app
        .reports
        .iter()
        .map(|report| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        report.date(),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(preview(&report.symptoms, 48), Style::default().fg(Color::Cyan)),
                ]),
                Line::from(format!("  {}", preview(&report.recommendation, 72))),
                Line::default(),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.report_state);
}

fn render_profile(app: &App, frame: &mut Frame, area: Rect) {
    let [head_area, tabs_area, body_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    // Header: patient name plus the wallet affordance
    let wallet_span = match &app.wallet_account {
        Some(address) => Span::styled(
            format!("Wallet: {}", truncate_address(address)),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled("Connect Wallet (w)", Style::default().fg(Color::Gray)),
    };
    let head = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", app.record.profile.name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("Medical Profile  ", Style::default().fg(Color::Gray)),
        wallet_span,
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(head, head_area);

    let tabs = Tabs::new(vec![" Profile ", " Medical Info ", " History "])
        .select(app.profile_tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("|");
    frame.render_widget(tabs, tabs_area);

    match app.profile_tab {
        ProfileTab::Profile => render_profile_tab(app, frame, body_area),
        ProfileTab::Medical => render_medical_tab(app, frame, body_area),
        ProfileTab::History => render_history_tab(app, frame, body_area),
    }
}

fn field(label: &str, value: &str) -> [Line<'static>; 2] {
    [
        Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            value.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ]
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
    ))
}

fn render_profile_tab(app: &App, frame: &mut Frame, area: Rect) {
    let profile = &app.record.profile;
    let last_checkup = app.record.last_checkup().unwrap_or("No checkups recorded");

    let mut lines = vec![section_title("Personal Information"), Line::default()];
    lines.extend(field("Full Name", &profile.name));
    lines.extend(field("Blood Type", &profile.blood_type));
    lines.push(Line::default());
    lines.push(section_title("Health Summary"));
    lines.push(Line::default());
    lines.extend(field("Last Checkup", last_checkup));
    lines.extend(field("Primary Physician", &profile.physician));

    let body = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)))
        .wrap(Wrap { trim: true });
    frame.render_widget(body, area);
}

fn render_medical_tab(app: &App, frame: &mut Frame, area: Rect) {
    let profile = &app.record.profile;

    let mut lines = vec![section_title("Allergies"), Line::default()];
    if profile.allergies.is_empty() {
        lines.push(Line::from(Span::styled(
            "No allergies recorded",
            Style::default().fg(Color::Gray),
        )));
    } else {
        for allergy in &profile.allergies {
            lines.push(Line::from(format!("  - {}", allergy)));
        }
    }

    lines.push(Line::default());
    lines.push(section_title("Conditions"));
    lines.push(Line::default());
    if profile.conditions.is_empty() {
        lines.push(Line::from(Span::styled(
            "No conditions recorded",
            Style::default().fg(Color::Gray),
        )));
    } else {
        for condition in &profile.conditions {
            lines.push(Line::from(format!("  - {}", condition)));
        }
    }

    let body = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)))
        .wrap(Wrap { trim: true });
    frame.render_widget(body, area);
}

fn render_history_tab(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Diagnosis History ");

    if app.record.history.is_empty() {
        let placeholder = Paragraph::new("No diagnosis history found")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let mut lines = Vec::new();
    for entry in &app.record.history {
        lines.push(Line::from(vec![
            Span::styled(
                entry.date.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(entry.diagnosis.clone()),
        ]));
    }

    let body = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(body, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PENDING_TEXT;

    #[test]
    fn line_breaks_become_stacked_lines() {
        let lines = message_lines("Line1\nLine2");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "Line1");
        assert_eq!(lines[1].to_string(), "Line2");
    }

    #[test]
    fn empty_segments_are_preserved() {
        assert_eq!(message_lines("a\n\nb").len(), 3);
        assert_eq!(message_lines("plain").len(), 1);
    }

    #[test]
    fn pending_message_renders_animated_placeholder() {
        let msg = ChatMessage {
            role: ChatRole::Assistant,
            text: PENDING_TEXT.to_string(),
            pending: true,
        };
        let lines = chat_message_lines(&msg, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].to_string(), "I'm analyzing your symptoms...");
    }

    #[test]
    fn preview_truncates_with_ellipsis() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("a very long symptom text", 6), "a very...");
    }
}
