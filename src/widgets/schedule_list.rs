use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::{App, LoadState};
use crate::cron::CronHumanizer;
use crate::theme;

pub fn render(app: &mut App, humanizer: &dyn CronHumanizer, frame: &mut Frame, area: Rect) {
    let schedules = match app.schedules {
        LoadState::Loaded(ref s) if !s.is_empty() => s,
        LoadState::Loaded(_) => {
            frame.render_widget(placeholder(" No schedules"), area);
            return;
        }
        LoadState::Error(ref msg) => {
            frame.render_widget(
                Paragraph::new(format!(" {}", msg))
                    .style(Style::default().fg(theme::RED)),
                area,
            );
            return;
        }
        LoadState::Loading | LoadState::NotLoaded => {
            frame.render_widget(placeholder(" Loading schedules..."), area);
            return;
        }
    };

    let header = Row::new(vec![
        Cell::from(" Name"),
        Cell::from("Agent"),
        Cell::from("Schedule"),
        Cell::from("Next Run"),
    ])
    .style(
        Style::default()
            .fg(theme::PURPLE)
            .add_modifier(Modifier::BOLD),
    )
    .height(1);

    let rows: Vec<Row> = schedules
        .iter()
        .map(|sch| {
            Row::new(vec![
                Cell::from(format!(" {}", sch.display_name())),
                Cell::from(format!("{} v{}", sch.graph_id, sch.graph_version))
                    .style(Style::default().fg(theme::TEXT_DIM)),
                Cell::from(humanizer.humanize(&sch.cron)),
                Cell::from(
                    sch.next_run_time
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string(),
                ),
            ])
            .style(Style::default().fg(theme::TEXT))
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::NONE))
        .row_highlight_style(
            Style::default()
                .bg(theme::BG_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(table, area, &mut app.schedule_table_state);
}

fn placeholder(text: &str) -> Paragraph<'_> {
    Paragraph::new(text).style(Style::default().fg(theme::TEXT_MUTED))
}
