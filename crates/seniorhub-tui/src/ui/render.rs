use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use seniorhub_core::{HouseholdStatus, ShellView};

use crate::app::{App, AppState};

use super::styles;

/// Tiles per row on the dashboard grid
const TILES_PER_ROW: usize = 2;

const TILE_HEIGHT: u16 = 6;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    match app.view() {
        ShellView::Loading => render_loading(frame, chunks[1]),
        ShellView::SignIn => render_sign_in(frame, app, chunks[1]),
        ShellView::Dashboard => render_dashboard(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  SeniorHub";
    let user = app
        .shell
        .session()
        .map(|s| format!("{} ", s.user.display_name()))
        .unwrap_or_default();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(title.len() + user.chars().count() + 2),
        )),
        Span::styled(user, styles::highlight_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let area = centered_rect_fixed(30, 3, area);
    let paragraph = Paragraph::new(Line::from(Span::styled("Loading...", styles::muted_style())))
        .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false)));
    frame.render_widget(paragraph, area);
}

fn render_sign_in(frame: &mut Frame, app: &App, area: Rect) {
    let error = app.shell.auth().error_message();
    let height = if error.is_some() { 13 } else { 11 };
    let area = centered_rect_fixed(50, height, area);

    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  Welcome to SeniorHub", styles::title_style())),
        Line::from(Span::styled(
            "  Daily life made easier for seniors and caregivers",
            styles::muted_style(),
        )),
        Line::from(""),
    ];

    if app.is_signing_in() {
        lines.push(Line::from(Span::styled(
            "  Finish signing in in your browser...",
            styles::highlight_style(),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  [Esc]", styles::help_key_style()),
            Span::styled(" cancel", styles::muted_style()),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::raw("        ["),
            Span::styled(" ▶ Sign in with Google ◀ ", styles::selected_style()),
            Span::raw("]"),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  [Enter]", styles::help_key_style()),
            Span::styled(" sign in  ", styles::muted_style()),
            Span::styled("[q]", styles::help_key_style()),
            Span::styled(" quit", styles::muted_style()),
        ]));
        if app.shell.demo_allowed() {
            lines.push(Line::from(vec![
                Span::styled("  [d]", styles::help_key_style()),
                Span::styled(" demo sign-in (development)", styles::muted_style()),
            ]));
        }
    }

    if let Some(error) = error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.tiles.len().div_ceil(TILES_PER_ROW);
    let mut constraints: Vec<Constraint> = (0..rows)
        .map(|_| Constraint::Length(TILE_HEIGHT))
        .collect();
    constraints.push(Constraint::Min(0));

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (row, chunk) in app.tiles.chunks(TILES_PER_ROW).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, TILES_PER_ROW as u32); TILES_PER_ROW])
            .split(row_areas[row]);

        for (col, tile) in chunk.iter().enumerate() {
            let index = row * TILES_PER_ROW + col;
            let selected = index == app.selected_tile;

            let mut lines = vec![
                Line::from(Span::styled(
                    format!("{} {}", tile.icon, tile.title),
                    if selected {
                        styles::selected_style()
                    } else {
                        styles::list_item_style()
                    },
                )),
                Line::from(Span::styled(tile.description, styles::muted_style())),
            ];
            if tile.id == "household" {
                let status_style = match app.household_status {
                    HouseholdStatus::Completed => styles::success_style(),
                    HouseholdStatus::None => styles::highlight_style(),
                };
                lines.push(Line::from(Span::styled(
                    app.household_status.label(),
                    status_style,
                )));
            }

            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(selected));
            frame.render_widget(Paragraph::new(lines).block(block), cells[col]);
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.view() {
        ShellView::Dashboard => "[←→] move | [Enter] open | [o] sign out | [q]uit",
        ShellView::SignIn if app.is_signing_in() => "[Esc] cancel",
        _ => "[q]uit",
    };

    let left_text = app
        .status_message
        .as_ref()
        .map(|msg| format!(" {} ", msg))
        .unwrap_or_default();
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
