use crate::app::{step_fields, App};
use enquiry_core::{Field, FieldValue, PackageOption, Wizard, WizardState, WizardStep};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let wizard = app.lock();

    // Title | Body | Step gauge | Keys
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(4),
            ]
            .as_ref(),
        )
        .split(f.area());

    let (state_label, state_color) = state_badge(wizard.state());
    let title_line = Line::from(vec![
        Span::styled("Book Your Lapland Adventure", Style::default().fg(Color::White)),
        Span::raw(" | "),
        Span::styled(state_label, Style::default().fg(state_color)),
    ]);
    f.render_widget(
        Block::default().borders(Borders::ALL).title(title_line),
        main_chunks[0],
    );

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(20),
                Constraint::Percentage(55),
                Constraint::Percentage(25),
            ]
            .as_ref(),
        )
        .split(main_chunks[1]);

    let sidebar = Paragraph::new(build_step_sidebar(&wizard))
        .block(Block::default().borders(Borders::ALL).title("Steps"));
    f.render_widget(sidebar, body_chunks[0]);

    let content_title = wizard
        .step()
        .map(|s| s.title())
        .unwrap_or("Enquiry");
    let items = build_content_lines(app, &wizard)
        .into_iter()
        .map(ListItem::new)
        .collect::<Vec<_>>();
    let content = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(content_title),
    );
    f.render_widget(content, body_chunks[1]);

    let summary = Paragraph::new(build_summary(app, &wizard))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Your trip"));
    f.render_widget(summary, body_chunks[2]);

    let (label, percent) = step_progress(wizard.state());
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Yellow))
        .label(label)
        .percent(percent);
    f.render_widget(gauge, main_chunks[2]);

    let legend_text = format!("{}\n{}", app.status_message, expected_actions(&wizard, app));
    let legend =
        Paragraph::new(legend_text).block(Block::default().borders(Borders::ALL).title("Keys"));
    f.render_widget(legend, main_chunks[3]);
}

fn state_badge(state: Option<WizardState>) -> (&'static str, Color) {
    match state {
        None => ("CLOSED", Color::DarkGray),
        Some(WizardState::Submitting) => ("SENDING", Color::Yellow),
        Some(WizardState::Success) => ("SENT", Color::Green),
        Some(WizardState::SubmitFailed) => ("NOT SENT", Color::Red),
        Some(_) => ("DRAFT", Color::Cyan),
    }
}

fn step_progress(state: Option<WizardState>) -> (String, u16) {
    match state {
        Some(WizardState::Success) => ("Done".to_string(), 100),
        Some(state) => match state.step() {
            Some(step) => {
                let total = WizardStep::all().len() as u16;
                let number = u16::from(step.number());
                (
                    format!("Step {} of {}", number, total),
                    number * 100 / total,
                )
            }
            None => ("Sending".to_string(), 100),
        },
        None => (String::new(), 0),
    }
}

pub fn build_step_sidebar(wizard: &Wizard) -> Vec<Line<'static>> {
    let current = wizard.step().map(|s| s.number());
    let done = matches!(wizard.state(), Some(WizardState::Success));
    WizardStep::all()
        .iter()
        .map(|step| {
            let number = step.number();
            let (marker, style) = match current {
                _ if done => ("✓", Style::default().fg(Color::Green)),
                Some(c) if number < c => ("✓", Style::default().fg(Color::Green)),
                Some(c) if number == c => (
                    "▶",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                _ => (" ", Style::default().fg(Color::DarkGray)),
            };
            Line::from(Span::styled(
                format!("{} {}. {}", marker, number, step.title()),
                style,
            ))
        })
        .collect()
}

/// Lines for the centre panel, including any validation messages.
pub fn build_content_lines(app: &App, wizard: &Wizard) -> Vec<Line<'static>> {
    let Some(state) = wizard.state() else {
        return vec![Line::from("The enquiry form is closed.")];
    };
    let mut lines = Vec::new();

    match state {
        WizardState::Success => {
            let (name, email) = wizard
                .confirmation()
                .map(|c| (c.first_name.clone(), c.email.clone()))
                .unwrap_or_default();
            lines.push(Line::from(Span::styled(
                format!("Thank You, {}!", name),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(
                "Your enquiry is with our Lapland specialists.",
            ));
            lines.push(Line::from(format!(
                "We will be in touch at {} within 24 hours.",
                email
            )));
            return lines;
        }
        WizardState::Submitting => {
            lines.push(Line::from(Span::styled(
                "Sending your enquiry...",
                Style::default().fg(Color::Yellow),
            )));
            return lines;
        }
        _ => {}
    }

    if let Some(message) = wizard.submission_error() {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    let Some(step) = state.step() else {
        return lines;
    };
    if step == WizardStep::Package {
        push_package_lines(&mut lines, app, wizard);
        return lines;
    }

    let focused = app.focused_field();
    for &field in step_fields(step) {
        let is_focused = focused == Some(field);
        let marker = if is_focused { "▶ " } else { "  " };
        let value = field_text(app, wizard, field, is_focused);
        let style = if is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{}: ", marker, field.label()), style),
            Span::raw(value),
        ]));
        if let Some(error) = wizard.error(field) {
            lines.push(Line::from(Span::styled(
                format!("    {}", error),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines
}

fn push_package_lines(lines: &mut Vec<Line<'static>>, app: &App, wizard: &Wizard) {
    let selected = wizard
        .data()
        .map(|d| d.selected_package.as_str())
        .unwrap_or_default();
    for (index, option) in app.options().iter().enumerate() {
        let radio = if option.id() == selected { "(•)" } else { "( )" };
        let style = if index == app.package_cursor() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let price = match option {
            PackageOption::Listed(summary) => {
                format!(" {} | {}", summary.duration, summary.price_label())
            }
            PackageOption::Custom => String::new(),
        };
        lines.push(Line::from(Span::styled(
            format!("{} {}{}", radio, option.name(), price),
            style,
        )));
        lines.push(Line::from(Span::styled(
            format!("    {}", option.description()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(error) = wizard.error(Field::SelectedPackage) {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
}

fn field_text(app: &App, wizard: &Wizard, field: Field, is_focused: bool) -> String {
    let Some(data) = wizard.data() else {
        return String::new();
    };
    match data.get(field) {
        FieldValue::Count(n) => format!("< {} >", n),
        FieldValue::Flag(on) => {
            if on { "[x]".to_string() } else { "[ ]".to_string() }
        }
        // The edit buffer may hold a date that does not parse yet.
        _ if is_focused => format!("{}▏", app.input().value()),
        FieldValue::Date(None) => "yyyy-mm-dd".to_string(),
        other => other.display(),
    }
}

fn build_summary(app: &App, wizard: &Wizard) -> Vec<Line<'static>> {
    let Some(data) = wizard.data() else {
        return Vec::new();
    };
    let dates = match (data.departure_date, data.return_date) {
        (Some(from), Some(to)) => format!("{} to {}", from, to),
        (Some(from), None) => format!("From {}", from),
        _ => "Dates not chosen".to_string(),
    };
    let package = if data.selected_package.trim().is_empty() {
        "No package yet".to_string()
    } else {
        app.catalogue()
            .display_name(&data.selected_package)
            .to_string()
    };
    vec![
        Line::from(dates),
        Line::from(format!(
            "{} adult(s), {} child(ren)",
            data.adults, data.children
        )),
        Line::from(package),
    ]
}

fn expected_actions(wizard: &Wizard, app: &App) -> &'static str {
    match wizard.state() {
        None => "Any key: exit",
        Some(WizardState::Success) => "Enter/Esc: close | Ctrl-C: quit",
        Some(WizardState::Submitting) => "Please wait | Esc: close",
        Some(WizardState::Step2) => {
            "↑/↓ ←/→: choose package | Enter: continue | Esc: back | Ctrl-C: quit"
        }
        Some(state) if state.accepts_submit() => {
            "Tab: next field | Space: toggle | Enter: submit | Esc: back"
        }
        Some(_) => match app.focused_field() {
            Some(Field::Adults) | Some(Field::Children) => {
                "←/→: change | Tab: next field | Enter: continue | Esc: cancel"
            }
            _ => "Type to edit | Tab: next field | Enter: continue | Esc: cancel",
        },
    }
}
