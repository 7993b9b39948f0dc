use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use ratatui::layout::{Constraint, Layout};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use a9s::action::Action;
use a9s::app::{App, Effect, Overlay, View};
use a9s::client::{AgentClient, HttpAgentClient};
use a9s::config::{Cli, ConfigFile, Settings};
use a9s::cron::{CronHumanizer, StandardCronHumanizer};
use a9s::event::{key_to_action, AppEvent, EventHandler};
use a9s::widgets;
use a9s::worker::{ApiHandle, ApiRequest, ApiWorker};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    // Logging depends on the resolved settings, so a bad config file is
    // reported on stderr and again once the subscriber is up.
    let (file, config_error) = match ConfigFile::load(cli.config.clone()) {
        Ok(file) => (file.unwrap_or_default(), None),
        Err(e) => {
            eprintln!("warning: {}", e);
            (ConfigFile::default(), Some(e))
        }
    };
    let settings = Settings::resolve(cli, file);

    // Set up logging; a TUI owns stdout so logs only go to a file
    let _log_guard = match settings.log_file {
        Some(ref log_file) => {
            let file = std::fs::File::create(log_file)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_writer(writer)
                .with_ansi(false)
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .init();
            Some(guard)
        }
        None => None,
    };

    if let Some(e) = config_error {
        tracing::warn!("{}", e);
    }

    run_tui(settings).await
}

async fn run_tui(settings: Settings) -> Result<()> {
    let client = HttpAgentClient::new(
        &settings.api_url,
        settings.api_key.clone(),
        settings.request_timeout,
    );

    let client: Arc<dyn AgentClient> = match client {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Failed to set up the agent API client: {}", e);
            eprintln!();
            eprintln!("Check the API settings:");
            eprintln!("  A9S_API_URL={}", settings.api_url);
            if settings.api_key.is_some() {
                eprintln!("  A9S_API_KEY=<set>");
            }
            std::process::exit(1);
        }
    };

    // Initialize app state
    let mut app = App::new();
    app.polling_interval = settings.poll_interval;
    app.base_polling_interval = settings.poll_interval;

    let humanizer = StandardCronHumanizer;

    // Set up channels
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create worker
    let (worker, api_handle) = ApiWorker::new(client, action_tx);
    tokio::spawn(worker.run());

    // Initial data load
    app.schedules = a9s::app::LoadState::Loading;
    api_handle.send(ApiRequest::LoadSchedules);

    let mut terminal = a9s::tui::init()?;
    let mut events = EventHandler::new(Duration::from_secs(1));

    tracing::info!("a9s started against {}", settings.api_url);

    // Main loop
    loop {
        terminal.draw(|frame| render(&mut app, &humanizer, &settings.api_url, frame))?;

        tokio::select! {
            Some(event) = events.next() => {
                let action = match event {
                    AppEvent::Key(key) => {
                        key_to_action(key, &app.view, &app.input_mode, &app.overlay)
                    }
                    AppEvent::Tick => Some(Action::Tick),
                };
                if let Some(action) = action {
                    let effects = app.update(action);
                    handle_effects(effects, &api_handle);
                }
            }
            Some(action) = action_rx.recv() => {
                let effects = app.update(action);
                handle_effects(effects, &api_handle);
            }
        }

        if app.should_quit {
            break;
        }
    }

    a9s::tui::restore()?;

    Ok(())
}

fn render(
    app: &mut App,
    humanizer: &dyn CronHumanizer,
    api_url: &str,
    frame: &mut ratatui::Frame,
) {
    let area = frame.area();

    frame.render_widget(
        ratatui::widgets::Block::default()
            .style(ratatui::style::Style::default().bg(a9s::theme::BG_DARK)),
        area,
    );

    let layout = Layout::vertical([
        Constraint::Length(1), // Status bar
        Constraint::Fill(1),   // Content
        Constraint::Length(1), // Footer
    ])
    .split(area);

    widgets::status_bar::render(app, api_url, frame, layout[0]);

    let content_area = layout[1];
    match app.view {
        View::ScheduleList => {
            widgets::schedule_list::render(app, humanizer, frame, content_area)
        }
        View::ScheduleDetail => {
            widgets::schedule_detail::render(app, humanizer, frame, content_area)
        }
    }

    widgets::footer::render(app, frame, layout[2]);

    match &app.overlay {
        Overlay::Help => widgets::help_overlay::render(&app.view, frame, area),
        Overlay::Confirm(action) => widgets::confirm_modal::render(action, frame, area),
        Overlay::None => {}
    }

    widgets::toast::render(app, frame, area);
}

fn handle_effects(effects: Vec<Effect>, api_handle: &ApiHandle) {
    for effect in effects {
        match effect {
            Effect::LoadSchedules => api_handle.send(ApiRequest::LoadSchedules),
            Effect::LoadGraph(graph_id, version) => {
                api_handle.send(ApiRequest::LoadGraph { graph_id, version });
            }
            Effect::RunNow(view, graph, schedule) => {
                api_handle.send(ApiRequest::RunNow {
                    view,
                    graph,
                    schedule,
                });
            }
            Effect::DeleteSchedule(schedule) => {
                api_handle.send(ApiRequest::DeleteSchedule { schedule });
            }
            Effect::Quit => {}
        }
    }
}
