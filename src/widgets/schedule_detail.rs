use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, LoadState};
use crate::cron::CronHumanizer;
use crate::details::{ActionButton, ActionVariant, InfoStat, InputField, ScheduleDetails};
use crate::theme;

const ASIDE_WIDTH: u16 = 30;

pub fn render(app: &App, humanizer: &dyn CronHumanizer, frame: &mut Frame, area: Rect) {
    let Some(ref schedule) = app.selected_schedule else {
        let loading = Paragraph::new(" Loading schedule detail...")
            .style(Style::default().fg(theme::TEXT_MUTED));
        frame.render_widget(loading, area);
        return;
    };

    let [main, aside] = Layout::horizontal([Constraint::Fill(1), Constraint::Length(ASIDE_WIDTH)])
        .spacing(1)
        .areas(area);
    let [info_area, input_area] =
        Layout::vertical([Constraint::Length(4), Constraint::Fill(1)]).areas(main);

    let details = ScheduleDetails::derive(
        app.graph.data(),
        schedule,
        humanizer,
        &chrono::Local,
        app.run_pending,
    );
    render_info(&details.stats, frame, info_area);
    render_inputs(app, details.inputs.as_deref(), frame, input_area);

    let run_buttons = details.run_actions;
    let agent_buttons = app.agent_actions();
    let run_height = run_buttons.len() as u16 + 2 + u16::from(app.last_forced_run.is_some());
    let [run_area, agent_area, _] = Layout::vertical([
        Constraint::Length(run_height),
        Constraint::Length(agent_buttons.len() as u16 + 2),
        Constraint::Fill(1),
    ])
    .spacing(1)
    .areas(aside);

    let mut run_lines: Vec<Line> = run_buttons.iter().map(button_line).collect();
    if let Some(ref run_id) = app.last_forced_run {
        run_lines.push(Line::from(Span::styled(
            format!(" started {}", run_id),
            Style::default().fg(theme::GREEN),
        )));
    }
    frame.render_widget(
        Paragraph::new(run_lines).block(card("Run actions")),
        run_area,
    );
    frame.render_widget(
        Paragraph::new(agent_buttons.iter().map(button_line).collect::<Vec<_>>())
            .block(card("Agent actions")),
        agent_area,
    );
}

fn render_info(stats: &[InfoStat], frame: &mut Frame, area: Rect) {
    let block = card("Info");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::horizontal(stats.iter().map(|_| Constraint::Ratio(1, stats.len() as u32)))
        .spacing(2)
        .split(inner);
    for (stat, column) in stats.iter().zip(columns.iter()) {
        let lines = vec![
            Line::from(Span::styled(
                stat.label,
                Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                stat.value.as_str(),
                Style::default().fg(theme::TEXT_DIM),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), *column);
    }
}

fn render_inputs(app: &App, inputs: Option<&[InputField]>, frame: &mut Frame, area: Rect) {
    let block = card("Input");

    let Some(inputs) = inputs else {
        let placeholder = match app.graph {
            LoadState::Error(ref msg) => Paragraph::new(format!(" {}", msg))
                .style(Style::default().fg(theme::RED))
                .wrap(Wrap { trim: true }),
            _ => Paragraph::new(" Loading inputs...")
                .style(Style::default().fg(theme::TEXT_MUTED)),
        };
        frame.render_widget(placeholder.block(block), area);
        return;
    };

    if inputs.is_empty() {
        let empty = Paragraph::new(" This schedule has no inputs")
            .style(Style::default().fg(theme::TEXT_MUTED))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let mut lines = Vec::with_capacity(inputs.len() * 3);
    for field in inputs {
        lines.push(Line::from(Span::styled(
            format!(" {}", field.title),
            Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD),
        )));
        // read-only field
        lines.push(Line::from(Span::styled(
            format!(" {} ", field.display_value()),
            Style::default().fg(theme::TEXT_DIM).bg(theme::BG_SURFACE),
        )));
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn button_line<A>(button: &ActionButton<A>) -> Line<'static> {
    let color = match (button.enabled, button.variant) {
        (false, _) => theme::TEXT_MUTED,
        (true, ActionVariant::Destructive) => theme::RED,
        (true, ActionVariant::Default) => theme::TEXT,
    };
    Line::from(vec![
        Span::styled(format!(" [{}] ", button.key), Style::default().fg(theme::PURPLE)),
        Span::styled(button.label, Style::default().fg(color)),
    ])
}

fn card(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::PURPLE_DIM))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(theme::PURPLE)
                .add_modifier(Modifier::BOLD),
        ))
}
