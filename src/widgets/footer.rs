use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, InputMode, View};
use crate::details::run_actions;
use crate::theme;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match app.input_mode {
        InputMode::PendingG => vec![hint("g", "top")],
        InputMode::Normal => match app.view {
            View::ScheduleList => vec![
                hint("j/k", "nav"),
                hint("Enter", "details"),
                hint("R", "refresh"),
                hint("?", "help"),
                hint("q", "quit"),
            ],
            View::ScheduleDetail => {
                let mut hints = vec![hint("j/k", "scroll"), hint("Esc", "back")];
                for button in run_actions(app.run_pending) {
                    if button.enabled {
                        hints.push((button.key.to_string(), button.label.to_lowercase()));
                    }
                }
                hints.push(hint("?", "help"));
                hints
            }
        },
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", Style::default()));
        }
        spans.push(Span::styled(
            key.as_str(),
            Style::default().fg(theme::PURPLE),
        ));
        spans.push(Span::styled(
            format!(":{}", desc),
            Style::default().fg(theme::TEXT_MUTED),
        ));
    }

    let line = Line::from(spans);
    let widget = Paragraph::new(line).style(Style::default().bg(theme::BG_SURFACE));
    frame.render_widget(widget, area);
}

fn hint(key: &str, desc: &str) -> (String, String) {
    (key.to_string(), desc.to_string())
}
