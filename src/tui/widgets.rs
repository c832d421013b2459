//! Screen rendering: contact list, detail, forms, logging steps, popups.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use crate::app::form::{self, EditForm, Field};
use crate::app::{App, ListMode, LogFlow, LogStep, Screen};
use crate::contact::interaction::INTERACTION_CHOICES;
use crate::contact::{Contact, Health, RELATIONSHIP_CHOICES, Timestamp};
use crate::task::STATE_CHOICES;

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn accent() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn health_style(health: Health) -> Style {
    match health {
        Health::Overdue => Style::default().fg(Color::Red),
        Health::NeedsAttention => Style::default().fg(Color::Yellow),
        Health::WithinThreshold => Style::default().fg(Color::Green),
        Health::Ok => dim(),
    }
}

fn health_glyph(health: Health) -> &'static str {
    match health {
        Health::Overdue => "●",
        Health::NeedsAttention => "!",
        Health::WithinThreshold => "●",
        Health::Ok => "○",
    }
}

fn days_text(contact: &Contact, now: Timestamp) -> String {
    match contact.elapsed_days(now) {
        None => "never".to_string(),
        Some(0) => "today".to_string(),
        Some(d) if d < 0 => format!("in {}d", -d),
        Some(d) => format!("{d}d ago"),
    }
}

fn hint(keys: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (i, (key, action)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", dim()));
        }
        spans.push(Span::styled(key.to_string(), accent()));
        spans.push(Span::styled(format!(" {action}"), dim()));
    }
    Line::from(spans)
}

/// Top-level render entry point.
pub fn render(frame: &mut Frame, app: &App, now: Timestamp) {
    let [header_area, body_area, message_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, header_area, app);

    if let Some(fatal) = &app.fatal {
        render_fatal(frame, body_area, fatal);
        frame.render_widget(Paragraph::new(hint(&[("q", "quit")])), footer_area);
        return;
    }

    match &app.screen {
        Screen::List(mode) => {
            render_list(frame, body_area, app, now);
            match mode {
                ListMode::Search => {
                    let line = Line::from(vec![
                        Span::styled("/", accent()),
                        Span::raw(app.contacts.query().to_string()),
                        Span::raw("█"),
                    ]);
                    frame.render_widget(Paragraph::new(line), message_area);
                }
                ListMode::FilterPopup => render_filter_popup(frame, body_area),
                ListMode::Browse => render_message(frame, message_area, app),
            }
        }
        Screen::Detail => {
            match app.selected_contact() {
                Some(contact) => render_detail(frame, body_area, contact, now),
                None => frame.render_widget(Paragraph::new("No contact selected"), body_area),
            }
            render_message(frame, message_area, app);
        }
        Screen::Edit(form) | Screen::Create(form) => {
            render_form(frame, body_area, form);
            render_message(frame, message_area, app);
        }
        Screen::Log(flow) => {
            let title = app
                .contacts
                .find(&flow.target)
                .map(|c| c.title.as_str())
                .unwrap_or("?");
            render_log(frame, body_area, flow, title);
            render_message(frame, message_area, app);
        }
        Screen::QuickType { target } => {
            let contact = app.contacts.find(target);
            render_quick_type(frame, body_area, contact);
            render_message(frame, message_area, app);
        }
    }

    frame.render_widget(Paragraph::new(footer(app)), footer_area);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            " kinship ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} ", app.header_summary())),
    ];
    if app.loading {
        spans.push(Span::styled("loading…", dim()));
    }
    if app.saving {
        spans.push(Span::styled("saving…", dim()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_message(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(message) = &app.message {
        let line = Line::from(Span::styled(
            format!("→ {message}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn render_fatal(frame: &mut Frame, area: Rect, message: &str) {
    let text = vec![
        Line::from(Span::styled(
            "Cannot load contacts",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled(
            "Fix the contacts directory and restart.",
            dim(),
        )),
    ];
    let widget = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" error "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn footer(app: &App) -> Line<'static> {
    match &app.screen {
        Screen::List(ListMode::Browse) => hint(&[
            ("enter", "open"),
            ("/", "search"),
            ("f", "filter"),
            ("d", "log"),
            ("s", "state"),
            ("T", "type"),
            ("b", "bump"),
            ("e", "edit"),
            ("c", "new"),
            ("q", "quit"),
        ]),
        Screen::List(ListMode::Search) => hint(&[("enter", "keep results"), ("esc", "clear")]),
        Screen::List(ListMode::FilterPopup) => hint(&[("esc", "close")]),
        Screen::Detail => hint(&[
            ("d", "log"),
            ("s", "state"),
            ("b", "bump"),
            ("e", "edit"),
            ("T", "type"),
            ("esc", "back"),
        ]),
        Screen::Edit(form) | Screen::Create(form) => match form.editing() {
            None => hint(&[("key", "edit field"), ("q", "save"), ("esc", "cancel")]),
            Some(edit) if edit.field.is_choice() => hint(&[("key", "choose"), ("esc", "back")]),
            Some(_) => hint(&[("enter", "keep"), ("esc", "discard")]),
        },
        Screen::Log(flow) => match flow.step {
            LogStep::PickType => hint(&[("esc", "cancel")]),
            LogStep::PickNextState { .. } if flow.is_state_only() => {
                hint(&[("esc", "log contact"), ("q", "cancel")])
            }
            LogStep::PickNextState { .. } => hint(&[("esc", "back"), ("q", "cancel")]),
            LogStep::EnterNote { .. } => {
                hint(&[("enter", "save"), ("esc", "back"), ("ctrl-q", "cancel")])
            }
        },
        Screen::QuickType { .. } => hint(&[("esc", "cancel")]),
    }
}

// ── List ────────────────────────────────────────────────────────────────

fn render_list(frame: &mut Frame, area: Rect, app: &App, now: Timestamp) {
    let items: Vec<ListItem> = app
        .contacts
        .iter()
        .map(|c| {
            let health = c.health(now);
            let kind = c
                .relationship_type
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_default();
            let mut spans = vec![
                Span::styled(format!("{} ", health_glyph(health)), health_style(health)),
                Span::styled(format!("{:<28}", c.title), bold()),
                Span::raw(format!("{:<30}", truncate(&c.company_role(), 29))),
                Span::styled(format!("{kind:<11}"), dim()),
                Span::styled(format!("{:>10}", days_text(c, now)), health_style(health)),
            ];
            if !c.state.is_empty() && c.state != crate::task::DEFAULT_STATE {
                spans.push(Span::styled(format!("  [{}]", c.state), accent()));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected((!empty).then(|| app.contacts.cursor()));
    frame.render_stateful_widget(list, area, &mut state);

    if empty && !app.loading {
        let inner = Rect::new(area.x + 2, area.y + 1, area.width.saturating_sub(4), 1);
        frame.render_widget(Paragraph::new(Span::styled("No contacts", dim())), inner);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

fn render_filter_popup(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled("Relationship type", accent())),
    ];
    for (key, kind) in &RELATIONSHIP_CHOICES {
        lines.push(Line::from(format!("  ({key}) {kind}")));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("State", accent())));
    for (key, state) in [('F', "followup"), ('P', "ping"), ('S', "scheduled"), ('T', "timeout")] {
        lines.push(Line::from(format!("  ({key}) {state}")));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Status", accent())));
    for (key, status) in [('o', "overdue"), ('d', "due soon"), ('g', "good timing")] {
        lines.push(Line::from(format!("  ({key}) {status}")));
    }
    lines.push(Line::default());
    lines.push(Line::from("  (a) show all"));

    let popup = centered(area, 36, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" filter ")),
        popup,
    );
}

// ── Detail ──────────────────────────────────────────────────────────────

fn field_line(label: &str, value: &str) -> Option<Line<'static>> {
    (!value.is_empty()).then(|| {
        Line::from(vec![
            Span::styled(format!("  {label:<14}"), dim()),
            Span::raw(value.to_string()),
        ])
    })
}

fn render_detail(frame: &mut Frame, area: Rect, contact: &Contact, now: Timestamp) {
    let health = contact.health(now);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(contact.title.clone(), accent()),
            Span::raw("  "),
            Span::styled(
                format!("{} {}", health_glyph(health), health.as_label()),
                health_style(health),
            ),
        ]),
        Line::default(),
        Line::from(Span::styled("Contact Information", accent())),
    ];

    let info = [
        ("Email", contact.email.as_str()),
        ("Phone", contact.phone.as_str()),
        ("Company", contact.company.as_str()),
        ("Role", contact.role.as_str()),
        ("Location", contact.location.as_str()),
        ("Birthday", contact.birthday.as_str()),
        ("LinkedIn", contact.linkedin.as_str()),
        ("Twitter", contact.twitter.as_str()),
        ("Website", contact.website.as_str()),
        ("Label", contact.label.as_str()),
    ];
    lines.extend(info.iter().filter_map(|(l, v)| field_line(l, v)));
    let tags = contact.user_tags().collect::<Vec<_>>().join(", ");
    lines.extend(field_line("Tags", &tags));

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Relationship", accent())));
    let kind = contact
        .relationship_type
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_default();
    lines.extend(field_line("Type", &kind));
    let style = contact
        .contact_style
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "periodic".to_string());
    lines.extend(field_line("Style", &style));
    let frequency = match contact.frequency_days() {
        0 => "no target".to_string(),
        d => format!("every {d} days"),
    };
    lines.extend(field_line("Frequency", &frequency));
    lines.extend(field_line("State", &contact.state));

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Contact History", accent())));
    lines.extend(field_line("Last contact", &days_text(contact, now)));
    lines.extend(field_line("Via", &contact.last_interaction_type));
    if let Some(bumped) = contact.last_bump_date {
        let text = format!(
            "{} (reviews: {})",
            bumped.format("%Y-%m-%d"),
            contact.bump_count
        );
        lines.extend(field_line("Last review", &text));
    }
    if !contact.related_contact_labels.is_empty() {
        lines.extend(field_line("Related", &contact.related_contact_labels.join(", ")));
    }
    lines.extend(field_line("Notes", &contact.notes));

    let body = contact.content.trim();
    if !body.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Recent Interactions", accent())));
        lines.extend(body.lines().map(|l| Line::from(format!("  {l}"))));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

// ── Edit / create ───────────────────────────────────────────────────────

fn render_form(frame: &mut Frame, area: Rect, form: &EditForm) {
    let title = if form.is_new() { " new contact " } else { " edit contact " };
    let editing = form.editing();
    let mut lines = Vec::new();

    for field in Field::ALL {
        let active = editing.is_some_and(|e| e.field == field);
        let value = match editing {
            Some(edit) if active && !field.is_choice() => format!("{}█", edit.draft),
            _ => form.value(field).to_string(),
        };
        let label_style = if active { accent() } else { dim() };
        lines.push(Line::from(vec![
            Span::styled(format!("  ({}) ", field.key()), label_style),
            Span::styled(format!("{:<10}", field.label()), label_style),
            Span::raw(value),
        ]));
        if active && field.is_choice() {
            for (key, label) in form::choices(field) {
                lines.push(Line::from(Span::styled(
                    format!("        ({key}) {label}"),
                    Style::default().fg(Color::Cyan),
                )));
            }
        }
    }

    if let Some(notice) = form.task_hint() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(notice, accent())));
    }

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(widget, area);
}

// ── Logging and quick type ──────────────────────────────────────────────

fn render_log(frame: &mut Frame, area: Rect, flow: &LogFlow, title: &str) {
    let state_only = flow.is_state_only();
    let mut lines = if state_only {
        vec![
            Line::from(Span::styled("Change State", accent())),
            Line::default(),
            Line::from(vec![Span::raw("Contact: "), Span::styled(title.to_string(), bold())]),
            Line::default(),
        ]
    } else {
        vec![
            Line::from(Span::styled("Log Contact", accent())),
            Line::default(),
            Line::from(vec![
                Span::raw("Recording interaction with "),
                Span::styled(title.to_string(), bold()),
            ]),
            Line::default(),
        ]
    };

    match &flow.step {
        LogStep::PickType => {
            lines.push(Line::from(Span::styled("Step 1 of 3: Interaction Type", dim())));
            lines.push(Line::default());
            lines.push(Line::from("How did you contact them?"));
            lines.push(Line::default());
            for (key, kind) in INTERACTION_CHOICES.iter() {
                lines.push(Line::from(vec![
                    Span::styled(format!("  ({key})  "), dim()),
                    Span::raw(kind.label()),
                ]));
            }
        }
        LogStep::PickNextState { kind } => {
            if state_only {
                lines.push(Line::from(Span::styled("Select new state", dim())));
            } else {
                lines.push(Line::from(Span::styled("Step 2 of 3: Next State", dim())));
                lines.push(Line::from(format!("Type: {kind}")));
            }
            lines.push(Line::default());
            lines.push(Line::from("What's the next state for this contact?"));
            lines.push(Line::default());
            for choice in &STATE_CHOICES {
                lines.push(Line::from(vec![
                    Span::styled(format!("  ({})  ", choice.key), dim()),
                    Span::raw(format!("{:<12}", choice.label)),
                    Span::styled(
                        choice.description,
                        dim().add_modifier(Modifier::ITALIC),
                    ),
                ]));
            }
        }
        LogStep::EnterNote {
            kind,
            next_state,
            note,
        } => {
            let step = if state_only { "Add Note (Optional)" } else { "Step 3 of 3: Add Note (Optional)" };
            lines.push(Line::from(Span::styled(step, dim())));
            if state_only {
                lines.push(Line::from(format!("State: {next_state}")));
            } else {
                lines.push(Line::from(format!("Type: {kind} • State: {next_state}")));
            }
            lines.push(Line::default());
            let shown = if note.is_empty() {
                Span::styled("(optional)█", dim().add_modifier(Modifier::ITALIC))
            } else {
                Span::raw(format!("{note}█"))
            };
            lines.push(Line::from(vec![Span::raw("  "), shown]));
        }
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_quick_type(frame: &mut Frame, area: Rect, contact: Option<&Contact>) {
    let mut lines = vec![Line::from(Span::styled("Change Relationship Type", accent()))];
    if let Some(c) = contact {
        let current = c
            .relationship_type
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "none".to_string());
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(c.title.clone(), bold()),
            Span::styled(format!("  (currently {current})"), dim()),
        ]));
    }
    lines.push(Line::default());
    for (key, kind) in &RELATIONSHIP_CHOICES {
        let freq = match kind.default_frequency_days() {
            0 => String::new(),
            d => format!("  every {d} days"),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  ({key})  "), dim()),
            Span::raw(format!("{:<12}", kind.as_str())),
            Span::styled(freq, dim()),
        ]));
    }
    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}
