use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use opsdeck_core::Route;

use crate::app::{App, AppState, LoginFocus};

use super::styles;

const LOGO: [&str; 3] = [
    "     ╔═╗╔═╗╔═╗╔╦╗╔═╗╔═╗╦╔═",
    "     ║ ║╠═╝╚═╗ ║║║╣ ║  ╠╩╗",
    "     ╚═╝╩  ╚═╝═╩╝╚═╝╚═╝╩ ╩",
];

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|l| Line::from(Span::styled(*l, styles::title_style())))
        .collect()
}

pub fn render(frame: &mut Frame, app: &App) {
    if app.on_login_screen() {
        render_login_screen(frame, app);
    } else {
        render_shell(frame, app);
    }

    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_shell(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(6),    // View
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_view(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3], "[1-6] views | [b]ack | [o] logout | [?] help | [q]uit");
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  opsdeck";
    let who = match app.session.user() {
        Some(user) => format!("{} ({})", user.display_name(), user.role_display()),
        None if !app.session.is_ready() => "verifying session...".to_string(),
        None => "signed in".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + who.chars().count() + 2),
        )),
        Span::styled(who, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.current_route();
    let mut spans = vec![Span::raw(" ")];
    for (i, route) in Route::shell_routes().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, route.name());
        if route == current {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_view(frame: &mut Frame, app: &App, area: Rect) {
    let route = app.current_route();
    let block = Block::default()
        .title(format!(" {} ", route.name()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let lines = match route {
        Route::Dashboard => dashboard_lines(app),
        _ => vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Location: ", styles::muted_style()),
                Span::styled(route.path(), styles::highlight_style()),
            ]),
            Line::from(vec![
                Span::styled("  Backend:  ", styles::muted_style()),
                Span::styled(app.session.api().base_url().to_string(), styles::list_item_style()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("  No {} to show.", route.name().to_lowercase()),
                styles::muted_style(),
            )),
        ],
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn dashboard_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];

    let Some(user) = app.session.user() else {
        let message = if app.session.is_ready() {
            "  Profile unavailable. Press [r] to retry."
        } else {
            "  Loading profile..."
        };
        lines.push(Line::from(Span::styled(message, styles::muted_style())));
        return lines;
    };

    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {:<14}", label), styles::muted_style()),
            Span::styled(value, styles::list_item_style()),
        ])
    };

    lines.push(Line::from(Span::styled(
        format!("  Welcome, {}", user.display_name()),
        styles::title_style(),
    )));
    lines.push(Line::from(""));
    lines.push(field("Role", user.role_display().to_string()));
    lines.push(field("Email", user.email.clone().unwrap_or_else(|| "-".to_string())));
    if let Some(id) = user.id {
        lines.push(field("User ID", id.to_string()));
    }
    let status = if user.is_active.unwrap_or(true) {
        Span::styled("active", styles::success_style())
    } else {
        Span::styled("disabled", styles::error_style())
    };
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<14}", "Status"), styles::muted_style()),
        status,
    ]));
    if let Some(created) = user.created_at {
        lines.push(field("Member since", created.format("%Y-%m-%d").to_string()));
    }
    lines
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect, shortcuts: &str) {
    let width = area.width as usize;
    let right_text = format!(" {} ", shortcuts);

    let (left_text, left_style) = match app.notifications.current() {
        Some(message) => (format!(" {} ", message), styles::error_style()),
        None => (String::new(), styles::muted_style()),
    };

    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn render_login_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    render_status_bar(frame, app, chunks[1], "[Tab] next field | [Esc] quit");

    let height = if app.login_error.is_some() { 14 } else { 12 };
    let area = centered_rect_fixed(46, height, chunks[0]);
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = if username_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(format!("{:<16}{}", app.login_username, cursor), username_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.chars().count().min(16));
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{:<16}{}", password_masked, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let button_label = if button_focused { " ▶ Login ◀ " } else { "   Login   " };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(button_label, button_style),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 19, frame.area());
    frame.render_widget(Clear, area);

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let mut help_text = logo_lines();
    help_text.push(Line::from(Span::styled(
        format!("              version {}", env!("CARGO_PKG_VERSION")),
        styles::muted_style(),
    )));
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(" Navigation", styles::highlight_style())));
    help_text.push(key("1-6", "Switch view"));
    help_text.push(key("←/→", "Previous/next view"));
    help_text.push(key("b", "Go back"));
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(" Session", styles::highlight_style())));
    help_text.push(key("r", "Reload profile"));
    help_text.push(key("o", "Log out"));
    help_text.push(key("q", "Quit"));
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        "        Press ? or Esc to close",
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "   Are you sure you want to quit?",
        styles::highlight_style(),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   Press ", styles::muted_style()),
        Span::styled("[Y]", styles::help_key_style()),
        Span::styled(" to quit, ", styles::muted_style()),
        Span::styled("[N]", styles::help_key_style()),
        Span::styled(" to cancel", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
