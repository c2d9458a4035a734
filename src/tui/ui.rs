use crate::affiliate::{OutreachStatus, PipelineView};
use crate::bulk::{BatchAction, JobState, Severity};
use crate::tui::app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

const MAX_NOTIFICATIONS_SHOWN: usize = 3;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let notification_count = app
        .controller
        .notifications()
        .active()
        .len()
        .min(MAX_NOTIFICATIONS_SHOWN);
    let notification_height = if notification_count == 0 {
        0
    } else {
        notification_count as u16 + 2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),                   // Header
            Constraint::Min(0),                      // Affiliates
            Constraint::Length(notification_height), // Notifications
            Constraint::Length(3),                   // Footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], app);
    draw_affiliate_list(frame, chunks[1], app);
    if notification_height > 0 {
        draw_notifications(frame, chunks[2], app);
    }
    draw_footer(frame, chunks[3], app);

    if app.help_mode {
        draw_help_window(frame);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(32)])
        .split(area);

    let filter = app.controller.filter();
    let selected = PipelineView::ALL
        .iter()
        .position(|view| *view == filter.view)
        .unwrap_or(0);
    let titles: Vec<Line> = PipelineView::ALL
        .iter()
        .map(|view| Line::from(view.title()))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Saved affiliates - {}", app.source)),
        )
        .select(selected)
        .style(Style::default().fg(Color::Cyan))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    let search_text = if app.search.search_mode {
        format!("/{}█", app.search.search_query)
    } else if filter.query.is_empty() {
        "/ to search".to_string()
    } else {
        format!("/{}", filter.query)
    };
    let search_style = if app.search.search_mode {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let search = Paragraph::new(search_text)
        .block(Block::default().borders(Borders::ALL).title("Search"))
        .style(search_style);
    frame.render_widget(search, chunks[1]);
}

fn draw_affiliate_list(frame: &mut Frame, area: Rect, app: &mut App) {
    let projection = app.controller.projection();
    let selection = app.controller.selection();
    let affiliates = app.controller.items().clone();

    let items: Vec<ListItem> = projection
        .visible
        .iter()
        .map(|&index| {
            let affiliate = &affiliates[index];
            let is_bulk_selected = selection.contains(&affiliate.id);
            let failed = app
                .controller
                .last_outcome(&affiliate.id)
                .is_some_and(|outcome| outcome.is_failure());

            let selection_indicator = if is_bulk_selected { "●" } else { " " };
            let failure_marker = if failed { "✗" } else { " " };
            let email = affiliate.email.as_deref().unwrap_or("-");
            let draft = if affiliate.has_message() { "✉" } else { " " };

            let name_style = if is_bulk_selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let line = Line::from(vec![
                Span::styled(format!("{}{} ", selection_indicator, failure_marker), Style::default().fg(Color::Red)),
                Span::styled(format!("{:<32} ", affiliate.display_name()), name_style),
                Span::styled(format!("{:<32} ", email), Style::default().fg(Color::Gray)),
                Span::styled(format!("{:<10}", affiliate.status), status_style(affiliate.status)),
                Span::raw(draft),
            ]);
            ListItem::new(line)
        })
        .collect();

    let title = format!(
        "Affiliates ({} shown, {} selected here, {} selected total)",
        projection.visible_count(),
        projection.visible_selection.len(),
        selection.len()
    );
    let empty = items.is_empty();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );

    let mut list_state = ListState::default();
    if !empty {
        list_state.select(Some(app.navigation.cursor));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn status_style(status: OutreachStatus) -> Style {
    match status {
        OutreachStatus::New => Style::default().fg(Color::DarkGray),
        OutreachStatus::Contacted => Style::default().fg(Color::Blue),
        OutreachStatus::Replied => Style::default().fg(Color::Green),
        OutreachStatus::Declined => Style::default().fg(Color::Red),
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Green,
    }
}

fn draw_notifications(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .controller
        .notifications()
        .active()
        .into_iter()
        .take(MAX_NOTIFICATIONS_SHOWN)
        .map(|notification| {
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", notification.severity),
                    Style::default()
                        .fg(severity_color(notification.severity))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(notification.message),
            ])
        })
        .collect();

    let notifications = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Notifications (c: dismiss)"))
        .wrap(Wrap { trim: true });
    frame.render_widget(notifications, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    match app.controller.job() {
        JobState::Running { kind, progress, .. } => {
            let ratio = if progress.total == 0 {
                0.0
            } else {
                progress.current as f64 / progress.total as f64
            };
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("x: cancel"))
                .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
                .ratio(ratio)
                .label(format!(
                    "{} {}/{}...",
                    kind.in_progress_label(),
                    progress.current,
                    progress.total
                ));
            frame.render_widget(gauge, area);
        }
        JobState::Finished { kind, summary, .. } => {
            let footer = Paragraph::new(summary.describe(kind.done_label(), kind.noun()))
                .block(Block::default().borders(Borders::ALL))
                .style(Style::default().fg(severity_color(summary.severity())));
            frame.render_widget(footer, area);
        }
        JobState::Idle => {
            let footer_text = if app.loading {
                "Loading saved affiliates...".to_string()
            } else if app.search.search_mode {
                "SEARCH | Enter: keep filter | Esc: clear | Backspace: delete".to_string()
            } else {
                format!(
                    "Items: {} | Selected: {} | Space: select | a/A: all/none | d: delete | e: find emails | g: generate | ?: help",
                    app.controller.items().len(),
                    app.controller.selection().len()
                )
            };
            let footer = Paragraph::new(footer_text)
                .block(Block::default().borders(Borders::ALL))
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(footer, area);
        }
    }
}

fn draw_help_window(frame: &mut Frame) {
    let help_text = [
        "Affiliate Pipeline - Keyboard Commands",
        "",
        "NAVIGATION:",
        "  ↑↓ / j/k          Navigate up/down",
        "  Tab / Shift+Tab   Next/previous view",
        "  /                 Search (Enter keeps the filter, Esc clears it)",
        "",
        "SELECTION:",
        "  Space             Select/deselect the affiliate under the cursor",
        "  a                 Select every affiliate in the current view",
        "  A                 Deselect every affiliate in the current view",
        "  Esc               Clear the whole selection",
        "",
        "BULK OPERATIONS (on selected affiliates in the current view):",
        "  d                 Delete",
        "  e                 Find emails (skips affiliates that have one)",
        "  g                 Generate outreach (skips existing drafts)",
        "  x                 Cancel the running operation",
        "  r                 Retry the failed affiliate under the cursor",
        "",
        "OTHER:",
        "  R                 Reload saved affiliates",
        "  c                 Dismiss the oldest notification",
        "  ?                 Show this help (press ? or Esc to close)",
        "  q / Ctrl+C        Quit application",
    ];

    let help_paragraph = Paragraph::new(help_text.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help - Keyboard Commands ")
                .style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false });

    let area = centered_rect(80, 80, frame.size());

    frame.render_widget(Clear, area);
    frame.render_widget(help_paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affiliate::actions::fake::FakeService;
    use crate::affiliate::models::affiliate;
    use crate::bulk::ControllerSettings;
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(140, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        App::new(
            Arc::new(FakeService::default()),
            ControllerSettings::default(),
            "http://localhost:3000".to_string(),
        )
    }

    #[tokio::test]
    async fn test_renders_rows_and_selection_marker() {
        let mut app = app();
        app.controller.set_items(vec![
            affiliate(1, "alpha.com", None),
            affiliate(2, "bravo.com", Some("hi@bravo.com")),
        ]);
        app.controller.toggle(2);

        let screen = render(&mut app);

        assert!(screen.contains("alpha.com"));
        assert!(screen.contains("● "));
        assert!(screen.contains("hi@bravo.com"));
        assert!(screen.contains("1 selected total"));
    }

    #[tokio::test]
    async fn test_footer_shows_progress_while_running() {
        let mut app = app();
        app.controller.set_items(vec![affiliate(1, "alpha.com", None)]);
        app.controller.select_all_visible();
        let _ticket = app
            .controller
            .begin_batch(crate::affiliate::BatchKind::Delete, |_| false)
            .unwrap();

        let screen = render(&mut app);

        assert!(screen.contains("Deleting 0/1..."));
    }

    #[tokio::test]
    async fn test_help_overlay() {
        let mut app = app();
        app.help_mode = true;

        let screen = render(&mut app);

        assert!(screen.contains("Keyboard Commands"));
    }

    #[test]
    fn test_centered_rect() {
        let area = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(area, Rect::new(25, 10, 50, 20));
    }
}
