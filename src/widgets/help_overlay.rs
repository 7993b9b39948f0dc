use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::app::View;
use crate::details::run_actions;
use crate::theme;

pub fn render(view: &View, frame: &mut Frame, area: Rect) {
    let mut lines = vec![];

    lines.push(Line::from(""));
    lines.push(section("Navigation"));
    match view {
        View::ScheduleList => {
            lines.push(binding("j / k / Up / Down", "Navigate up/down"));
            lines.push(binding("gg / G", "Go to top / bottom"));
            lines.push(binding("Ctrl+D / Ctrl+U", "Page down / up"));
            lines.push(binding("Enter", "Open schedule details"));
        }
        View::ScheduleDetail => {
            lines.push(binding("j / k / Up / Down", "Scroll"));
            lines.push(binding("Esc", "Back to schedules"));
        }
    }

    if *view == View::ScheduleDetail {
        lines.push(Line::from(""));
        lines.push(section("Run Actions"));
        for button in run_actions(false) {
            lines.push(binding_owned(button.key.to_string(), button.label));
        }
    }

    lines.push(Line::from(""));
    lines.push(section("General"));
    lines.push(binding("R / Ctrl+R", "Refresh"));
    lines.push(binding("P", "Pause/resume polling"));
    lines.push(binding("?", "Toggle this help"));
    lines.push(binding("q", "Quit"));

    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(4));
    let modal_area = centered_rect(60, height, area);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::PURPLE))
        .title(" Help (? to close) ");

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, modal_area);
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        format!("  {}", title),
        Style::default()
            .fg(theme::PURPLE)
            .add_modifier(Modifier::BOLD),
    ))
}

fn binding<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    binding_owned(key.to_string(), desc)
}

fn binding_owned(key: String, desc: &str) -> Line<'_> {
    Line::from(vec![
        Span::styled(format!("    {:<22}", key), Style::default().fg(theme::YELLOW)),
        Span::styled(desc, Style::default().fg(theme::TEXT)),
    ])
}
