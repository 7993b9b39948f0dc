use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, ConnectionStatus, View};
use crate::theme;

pub fn render(app: &App, api_url: &str, frame: &mut Frame, area: Rect) {
    let connection_indicator = match &app.connection_status {
        ConnectionStatus::Connected => {
            Span::styled("● Connected", Style::default().fg(theme::GREEN))
        }
        ConnectionStatus::Connecting => {
            Span::styled("◌ Connecting...", Style::default().fg(theme::YELLOW))
        }
        ConnectionStatus::Error(msg) => {
            Span::styled(format!("✗ {}", msg), Style::default().fg(theme::RED))
        }
    };

    let endpoint = Span::styled(format!("  {}", api_url), Style::default().fg(theme::CYAN));

    let polling = if !app.polling_enabled {
        Span::styled("  ⏸ paused", Style::default().fg(theme::YELLOW))
    } else if app.error_count > 0 {
        Span::styled(
            format!("  ↻ backoff {}s", app.polling_interval.as_secs()),
            Style::default().fg(theme::YELLOW),
        )
    } else {
        Span::styled("  ↻ polling", Style::default().fg(theme::TEXT_MUTED))
    };

    let location = match app.view {
        View::ScheduleList => Span::styled("  Schedules", Style::default().fg(theme::TEXT_DIM)),
        View::ScheduleDetail => {
            let schedule = app
                .selected_schedule
                .as_ref()
                .map(|s| s.display_name())
                .unwrap_or("-");
            let text = match app.graph.data() {
                Some(graph) if !graph.name.is_empty() => {
                    format!("  Schedules › {} ({} v{})", schedule, graph.name, graph.version)
                }
                _ => format!("  Schedules › {}", schedule),
            };
            Span::styled(text, Style::default().fg(theme::TEXT_DIM))
        }
    };

    let line = Line::from(vec![connection_indicator, endpoint, polling, location]);
    let widget = Paragraph::new(line).style(Style::default().bg(theme::BG_BAR));
    frame.render_widget(widget, area);
}
