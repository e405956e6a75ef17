//! Pure view/render functions.
//!
//! Functions here take `&AppState` by immutable reference and draw to a
//! ratatui frame. No mutations, no effects.

use mailsweep_core::models::SenderStatus;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::state::{AppState, CallbackState, CategoryFilter, Screen, UnsubscribeOutcome};
use crate::view::{self, Row};

const HEADER_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 1;

const DIM: Style = Style::new().fg(Color::DarkGray);
const ACCENT: Style = Style::new().fg(Color::Cyan);

pub fn render(app: &AppState, frame: &mut Frame) {
    match &app.screen {
        Screen::Landing => render_landing(app, frame),
        Screen::Callback(callback) => render_callback(callback, frame),
        Screen::Dashboard => render_dashboard(app, frame),
    }
}

fn render_landing(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let mut lines = vec![
        Line::default(),
        Line::styled("mailsweep", ACCENT.add_modifier(Modifier::BOLD)),
        Line::styled("Find and drop the newsletters you never read.", DIM),
        Line::default(),
        keys_line(&[("g", "sign in with Google"), ("m", "sign in with Microsoft")]),
        keys_line(&[("q", "quit")]),
    ];
    if let Some(status) = &app.status {
        lines.push(Line::default());
        lines.push(Line::styled(status.clone(), Style::new().fg(Color::Yellow)));
    }
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, centered(area, 60, 10));
}

fn render_callback(callback: &CallbackState, frame: &mut Frame) {
    let area = frame.area();
    let lines = match callback {
        CallbackState::AwaitingCode {
            provider,
            auth_url,
            input,
        } => {
            let mut lines = vec![
                Line::styled(
                    format!("Finish signing in with {}", provider.label()),
                    ACCENT.add_modifier(Modifier::BOLD),
                ),
                Line::default(),
                Line::from("A browser window should have opened. If not, visit:"),
                Line::styled(auth_url.clone(), DIM),
                Line::default(),
                Line::from("Paste the redirect URL (or just the code) and press Enter:"),
                Line::from(vec![
                    Span::styled("> ", ACCENT),
                    Span::raw(input.clone()),
                    Span::styled("_", DIM),
                ]),
            ];
            lines.push(Line::default());
            lines.push(keys_line(&[("Enter", "submit"), ("Esc", "back")]));
            lines
        }
        CallbackState::Exchanging { provider } => vec![
            Line::styled(
                format!("Signing you in with {}...", provider.label()),
                ACCENT,
            ),
        ],
    };
    let block = Block::default().borders(Borders::ALL).title(" sign in ");
    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, centered(area, 70, 14));
}

fn render_dashboard(app: &AppState, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    render_rows(app, frame, chunks[1]);
    render_status(app, frame, chunks[2]);
    render_footer(app, frame, chunks[3]);
}

fn render_header(app: &AppState, frame: &mut Frame, area: Rect) {
    let session = app.session.session();
    let name = session
        .user
        .as_ref()
        .map_or("", |user| user.display_name.as_str());

    let mut badges: Vec<Span> = vec![Span::raw(name.to_string()), Span::raw("  ")];
    if let Some(user) = &session.user {
        badges.push(badge("gmail", user.gmail_connected));
        badges.push(Span::raw(" "));
        badges.push(badge("outlook", user.outlook_connected));
    }

    let totals = app.dashboard.snapshot.as_ref().map_or_else(Line::default, |s| {
        Line::from(vec![
            Span::styled(format!("{} senders", s.total_senders), DIM),
            Span::raw("  "),
            Span::styled(format!("{} active", s.total_active), Style::new().fg(Color::Green)),
            Span::raw("  "),
            Span::styled(format!("{} unsubscribed", s.total_unsubscribed), DIM),
            Span::raw("  "),
            Span::styled(filter_label(app), ACCENT),
        ])
    });

    let paragraph = Paragraph::new(vec![Line::from(badges), totals])
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(paragraph, area);
}

fn filter_label(app: &AppState) -> String {
    match &app.dashboard.filter.active_category {
        CategoryFilter::All => "all categories".to_string(),
        CategoryFilter::Category(category) => format!("filter: {category}"),
    }
}

fn render_rows(app: &AppState, frame: &mut Frame, area: Rect) {
    let dash = &app.dashboard;
    let Some(snapshot) = &dash.snapshot else {
        let text = if dash.loading {
            "Loading your dashboard..."
        } else {
            "No dashboard yet. Press r to load."
        };
        frame.render_widget(Paragraph::new(Line::styled(text, DIM)), area);
        return;
    };

    let rows = view::project(snapshot, &dash.filter);
    if rows.is_empty() {
        let lines = vec![
            Line::default(),
            Line::from("No subscriptions yet."),
            Line::styled("Press s to scan your inbox for them.", DIM),
        ];
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            area,
        );
        return;
    }

    // Keep the cursor inside the visible window.
    let height = area.height as usize;
    let offset = dash.cursor.saturating_sub(height.saturating_sub(1));

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(index, row)| {
            let selected = index == dash.cursor;
            let line = match row {
                Row::CategoryHeader {
                    category,
                    expanded,
                    active,
                    unsubscribed,
                } => header_line(category, *expanded, *active, *unsubscribed),
                Row::Sender(sender) => sender_line(app, sender),
            };
            if selected {
                line.style(Style::new().bg(Color::DarkGray))
            } else {
                line
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn header_line(category: &str, expanded: bool, active: usize, unsubscribed: usize) -> Line<'static> {
    let marker = if expanded { "▾" } else { "▸" };
    Line::from(vec![
        Span::styled(format!("{marker} {category}"), ACCENT.add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {active} active, {unsubscribed} unsubscribed"),
            DIM,
        ),
    ])
}

fn sender_line(app: &AppState, sender: &mailsweep_core::models::SubscriptionSender) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!("   {}", sender.display_name())),
        Span::styled(format!("  <{}>", sender.sender_email), DIM),
        Span::styled(format!("  [{}]", sender.account_type), DIM),
    ];
    if let Some(frequency) = &sender.frequency {
        spans.push(Span::styled(format!("  {frequency}"), DIM));
    }
    spans.push(Span::raw("  "));
    spans.push(sender_badge(app, sender));
    Line::from(spans)
}

fn sender_badge(
    app: &AppState,
    sender: &mailsweep_core::models::SubscriptionSender,
) -> Span<'static> {
    if sender.status == SenderStatus::Unsubscribed {
        return Span::styled("✓ unsubscribed", Style::new().fg(Color::Green));
    }
    if app.dashboard.in_flight_unsubscribes.contains(&sender.id) {
        return Span::styled("working...", Style::new().fg(Color::Yellow));
    }
    match app.dashboard.outcomes.get(&sender.id) {
        Some(UnsubscribeOutcome::Succeeded { url: Some(_), .. }) => {
            Span::styled("press u to open the unsubscribe page", Style::new().fg(Color::Yellow))
        }
        Some(UnsubscribeOutcome::Succeeded { .. }) => {
            Span::styled("✓ unsubscribed", Style::new().fg(Color::Green))
        }
        Some(UnsubscribeOutcome::Failed { reason }) => {
            Span::styled(format!("failed: {reason}"), Style::new().fg(Color::Red))
        }
        None => Span::styled("u to unsubscribe", DIM),
    }
}

fn render_status(app: &AppState, frame: &mut Frame, area: Rect) {
    let dash = &app.dashboard;
    let line = if let Some(scan_status) = &dash.scan_status {
        Line::styled(scan_status.clone(), Style::new().fg(Color::Yellow))
    } else if let Some(error) = &dash.load_error {
        Line::styled(error.clone(), Style::new().fg(Color::Red))
    } else if let Some(status) = &app.status {
        Line::styled(status.clone(), Style::new().fg(Color::Yellow))
    } else if dash.loading {
        Line::styled("Refreshing...", DIM)
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(app: &AppState, frame: &mut Frame, area: Rect) {
    let user = app.session.session().user.as_ref();
    let mut keys: Vec<(&str, &str)> = vec![
        ("j/k", "move"),
        ("enter", "fold"),
        ("u", "unsubscribe"),
        ("c", "category"),
        ("f", "filter"),
        ("s", "scan"),
        ("r", "reload"),
    ];
    if user.is_some_and(|u| !u.gmail_connected) {
        keys.push(("1", "connect gmail"));
    }
    if user.is_some_and(|u| !u.outlook_connected) {
        keys.push(("2", "connect outlook"));
    }
    keys.push(("l", "log out"));
    keys.push(("q", "quit"));
    frame.render_widget(Paragraph::new(keys_line(&keys)), area);
}

fn keys_line(keys: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (index, (key, label)) in keys.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled("  ", DIM));
        }
        spans.push(Span::styled(format!("[{key}]"), ACCENT));
        spans.push(Span::raw(format!(" {label}")));
    }
    Line::from(spans)
}

fn badge(label: &str, connected: bool) -> Span<'static> {
    if connected {
        Span::styled(format!("● {label}"), Style::new().fg(Color::Green))
    } else {
        Span::styled(format!("○ {label}"), DIM)
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
