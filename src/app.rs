use std::time::{Duration, Instant};

use ratatui::widgets::TableState;

use crate::action::{Action, AgentActionKind};
use crate::details::{ActionButton, ActionVariant, RunActionKind};
use crate::dispatch::{RunNowOutcome, ViewToken};
use crate::domain::*;

const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    ScheduleList,
    ScheduleDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    PendingG,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    Confirm(ConfirmAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteSchedule(ScheduleId),
}

#[derive(Debug, Clone)]
pub enum LoadState<T> {
    NotLoaded,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> LoadState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub at: Instant,
}

#[derive(Debug, Clone)]
pub enum Effect {
    LoadSchedules,
    LoadGraph(GraphId, u32),
    RunNow(ViewToken, Box<GraphMeta>, Box<Schedule>),
    DeleteSchedule(Box<Schedule>),
    Quit,
}

pub struct App {
    // View state
    pub view: View,
    pub input_mode: InputMode,
    pub overlay: Overlay,
    pub connection_status: ConnectionStatus,

    // Schedule data
    pub schedules: LoadState<Vec<Schedule>>,
    pub schedule_table_state: TableState,
    pub selected_schedule: Option<Schedule>,
    pub graph: LoadState<GraphMeta>,
    /// Bumped every time a details view is opened.
    pub detail_view: ViewToken,

    // Run now
    pub run_pending: bool,
    pub last_forced_run: Option<GraphExecutionId>,

    // Detail scroll
    pub detail_scroll: u16,

    // Polling
    pub polling_enabled: bool,
    pub polling_interval: Duration,
    pub base_polling_interval: Duration,
    pub last_refresh: Option<Instant>,
    pub error_count: u32,

    // App
    pub should_quit: bool,
    pub toast: Option<Toast>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            view: View::ScheduleList,
            input_mode: InputMode::Normal,
            overlay: Overlay::None,
            connection_status: ConnectionStatus::Connecting,

            schedules: LoadState::NotLoaded,
            schedule_table_state: TableState::default(),
            selected_schedule: None,
            graph: LoadState::NotLoaded,
            detail_view: ViewToken::default(),

            run_pending: false,
            last_forced_run: None,

            detail_scroll: 0,

            polling_enabled: true,
            polling_interval: Duration::from_secs(10),
            base_polling_interval: Duration::from_secs(10),
            last_refresh: None,
            error_count: 0,

            should_quit: false,
            toast: None,
        }
    }

    pub fn update(&mut self, action: Action) -> Vec<Effect> {
        // Clear stale toasts
        if let Some(ref toast) = self.toast {
            if toast.at.elapsed() > TOAST_TTL {
                self.toast = None;
            }
        }

        if self.input_mode == InputMode::PendingG && !matches!(action, Action::NavigateTop) {
            self.input_mode = InputMode::Normal;
        }

        match action {
            // Navigation
            Action::NavigateUp => {
                if self.is_detail_view() {
                    self.detail_scroll = self.detail_scroll.saturating_sub(1);
                } else {
                    self.schedule_table_state.select_previous();
                }
                vec![]
            }
            Action::NavigateDown => {
                if self.is_detail_view() {
                    self.detail_scroll = self.detail_scroll.saturating_add(1);
                } else if self.schedule_count() > 0 {
                    self.schedule_table_state.select_next();
                }
                vec![]
            }
            Action::NavigateTop => {
                self.input_mode = InputMode::Normal;
                if self.is_detail_view() {
                    self.detail_scroll = 0;
                } else {
                    self.schedule_table_state.select_first();
                }
                vec![]
            }
            Action::NavigateBottom => {
                if self.is_detail_view() {
                    self.detail_scroll = u16::MAX;
                } else {
                    self.schedule_table_state.select_last();
                }
                vec![]
            }
            Action::PageUp => {
                if self.is_detail_view() {
                    self.detail_scroll = self.detail_scroll.saturating_sub(self.page_height() as u16);
                } else {
                    for _ in 0..self.page_height() {
                        self.schedule_table_state.select_previous();
                    }
                }
                vec![]
            }
            Action::PageDown => {
                if self.is_detail_view() {
                    self.detail_scroll = self.detail_scroll.saturating_add(self.page_height() as u16);
                } else if self.schedule_count() > 0 {
                    for _ in 0..self.page_height() {
                        self.schedule_table_state.select_next();
                    }
                }
                vec![]
            }
            Action::Select => self.handle_select(),
            Action::Back => self.handle_back(),

            // Vim chord
            Action::EnterPendingG => {
                self.input_mode = InputMode::PendingG;
                vec![]
            }

            // Detail actions
            Action::RunAction(kind) => self.run_action(kind),
            Action::AgentAction(kind) => match kind {
                AgentActionKind::Refresh => self.refresh_current_view(),
                AgentActionKind::TogglePolling => {
                    self.polling_enabled = !self.polling_enabled;
                    vec![]
                }
            },

            // UI
            Action::ConfirmOverlay => {
                let overlay = std::mem::replace(&mut self.overlay, Overlay::None);
                match overlay {
                    Overlay::Confirm(ConfirmAction::DeleteSchedule(id)) => {
                        match self.selected_schedule_summary() {
                            Some(schedule) if schedule.id == id => {
                                vec![Effect::DeleteSchedule(Box::new(schedule.clone()))]
                            }
                            _ => {
                                tracing::debug!("delete of {} dropped: selection changed", id);
                                vec![]
                            }
                        }
                    }
                    other => {
                        self.overlay = other;
                        vec![]
                    }
                }
            }
            Action::CloseOverlay => {
                self.overlay = Overlay::None;
                vec![]
            }
            Action::ToggleHelp => {
                self.overlay = if self.overlay == Overlay::Help {
                    Overlay::None
                } else {
                    Overlay::Help
                };
                vec![]
            }

            // Data responses
            Action::SchedulesLoaded(schedules) => {
                if let Some(ref mut selected) = self.selected_schedule {
                    if let Some(fresh) = schedules.iter().find(|s| s.id == selected.id) {
                        *selected = fresh.clone();
                    }
                }
                self.schedules = LoadState::Loaded(schedules);
                self.connection_status = ConnectionStatus::Connected;
                self.reset_backoff();
                self.last_refresh = Some(Instant::now());
                if self.schedule_table_state.selected().is_none() {
                    self.schedule_table_state.select_first();
                }
                vec![]
            }
            Action::GraphLoaded(graph) => {
                match self.selected_schedule {
                    Some(ref schedule) if schedule.graph_id == graph.id => {
                        self.graph = LoadState::Loaded(*graph);
                    }
                    _ => tracing::debug!("graph {} arrived for a closed schedule", graph.id),
                }
                vec![]
            }
            Action::GraphLoadFailed(msg) => {
                if self.is_detail_view() {
                    self.graph = LoadState::Error(msg.clone());
                }
                self.show_toast(msg, ToastLevel::Error);
                vec![]
            }
            Action::ForcedRun {
                view,
                schedule_id,
                run_id,
            } => {
                if self.is_current_view(view) {
                    self.show_toast(format!("Started run {}", run_id), ToastLevel::Info);
                    self.last_forced_run = Some(run_id);
                } else {
                    tracing::debug!(
                        "run {} of schedule {} finished after its view closed",
                        run_id,
                        schedule_id
                    );
                }
                vec![]
            }
            Action::RunNowSettled {
                view,
                schedule_id,
                outcome,
            } => {
                if self.is_current_view(view) {
                    self.run_pending = false;
                    if outcome == RunNowOutcome::AlreadyPending {
                        self.show_toast(
                            "Another run is still starting".to_string(),
                            ToastLevel::Info,
                        );
                    }
                } else {
                    tracing::debug!("run now for schedule {} settled after its view closed", schedule_id);
                }
                vec![]
            }
            Action::ScheduleDeleted(schedule_id) => {
                if let LoadState::Loaded(ref mut schedules) = self.schedules {
                    schedules.retain(|s| s.id != schedule_id);
                }
                if self.is_showing_schedule(&schedule_id) {
                    self.close_detail();
                }
                self.show_toast(format!("Deleted schedule {}", schedule_id), ToastLevel::Info);
                vec![Effect::LoadSchedules]
            }
            Action::FailureReported { context, message } => {
                self.show_toast(
                    format!("Could not {}: {}", context, message),
                    ToastLevel::Error,
                );
                vec![]
            }

            // App control
            Action::Refresh => self.refresh_current_view(),
            Action::Quit => {
                self.should_quit = true;
                vec![Effect::Quit]
            }
            Action::Tick => {
                if self.polling_enabled {
                    let should_poll = self
                        .last_refresh
                        .map(|t| t.elapsed() >= self.polling_interval)
                        .unwrap_or(true);
                    if should_poll {
                        self.last_refresh = Some(Instant::now());
                        return self.refresh_current_view();
                    }
                }
                vec![]
            }
            Action::Error(msg) => {
                if self.schedules.is_loading() {
                    self.schedules = LoadState::Error(msg.clone());
                }
                self.show_toast(msg.clone(), ToastLevel::Error);
                self.error_count += 1;
                self.apply_backoff();
                if self.connection_status == ConnectionStatus::Connected {
                    self.connection_status = ConnectionStatus::Error(msg);
                }
                vec![]
            }
        }
    }

    /// Caller-supplied actions shown in the "Agent actions" group.
    pub fn agent_actions(&self) -> Vec<ActionButton<AgentActionKind>> {
        vec![
            ActionButton {
                action: AgentActionKind::Refresh,
                label: "Refresh",
                key: 'R',
                variant: ActionVariant::Default,
                enabled: true,
            },
            ActionButton {
                action: AgentActionKind::TogglePolling,
                label: if self.polling_enabled {
                    "Pause polling"
                } else {
                    "Resume polling"
                },
                key: 'P',
                variant: ActionVariant::Default,
                enabled: true,
            },
        ]
    }

    pub fn selected_graph(&self) -> Option<&GraphMeta> {
        self.graph.data()
    }

    fn run_action(&mut self, kind: RunActionKind) -> Vec<Effect> {
        if !self.is_detail_view() {
            return vec![];
        }
        let Some(schedule) = self.selected_schedule.clone() else {
            self.show_toast("no schedule selected".to_string(), ToastLevel::Error);
            return vec![];
        };

        match kind {
            RunActionKind::RunNow => {
                if self.run_pending {
                    tracing::debug!("run now ignored: a run is already starting");
                    return vec![];
                }
                let Some(graph) = self.graph.data().cloned() else {
                    self.show_toast("agent is still loading".to_string(), ToastLevel::Error);
                    return vec![];
                };
                self.run_pending = true;
                vec![Effect::RunNow(
                    self.detail_view,
                    Box::new(graph),
                    Box::new(schedule),
                )]
            }
            RunActionKind::DeleteSchedule => {
                self.overlay = Overlay::Confirm(ConfirmAction::DeleteSchedule(schedule.id));
                vec![]
            }
        }
    }

    fn handle_select(&mut self) -> Vec<Effect> {
        if self.view != View::ScheduleList {
            return vec![];
        }
        let Some(schedule) = self.selected_schedule_summary().cloned() else {
            return vec![];
        };

        let effects = vec![Effect::LoadGraph(
            schedule.graph_id.clone(),
            schedule.graph_version,
        )];
        self.view = View::ScheduleDetail;
        self.detail_view = self.detail_view.next();
        self.selected_schedule = Some(schedule);
        self.graph = LoadState::Loading;
        self.run_pending = false;
        self.last_forced_run = None;
        self.detail_scroll = 0;
        effects
    }

    fn handle_back(&mut self) -> Vec<Effect> {
        if self.is_detail_view() {
            self.close_detail();
        }
        vec![]
    }

    fn close_detail(&mut self) {
        self.view = View::ScheduleList;
        self.selected_schedule = None;
        self.graph = LoadState::NotLoaded;
        self.run_pending = false;
        self.last_forced_run = None;
        self.overlay = Overlay::None;
    }

    fn refresh_current_view(&mut self) -> Vec<Effect> {
        match self.view {
            View::ScheduleList => vec![Effect::LoadSchedules],
            View::ScheduleDetail => {
                let mut effects = vec![Effect::LoadSchedules];
                if let (Some(schedule), LoadState::Error(_)) = (&self.selected_schedule, &self.graph) {
                    effects.push(Effect::LoadGraph(
                        schedule.graph_id.clone(),
                        schedule.graph_version,
                    ));
                    self.graph = LoadState::Loading;
                }
                effects
            }
        }
    }

    fn selected_schedule_summary(&self) -> Option<&Schedule> {
        match self.view {
            View::ScheduleList => {
                let schedules = self.schedules.data()?;
                let idx = self.schedule_table_state.selected()?;
                schedules.get(idx)
            }
            View::ScheduleDetail => self.selected_schedule.as_ref(),
        }
    }

    fn is_showing_schedule(&self, schedule_id: &str) -> bool {
        self.is_detail_view()
            && self
                .selected_schedule
                .as_ref()
                .is_some_and(|s| s.id == schedule_id)
    }

    fn is_current_view(&self, view: ViewToken) -> bool {
        self.is_detail_view() && self.detail_view == view
    }

    fn is_detail_view(&self) -> bool {
        self.view == View::ScheduleDetail
    }

    fn schedule_count(&self) -> usize {
        self.schedules.data().map(|s| s.len()).unwrap_or(0)
    }

    fn show_toast(&mut self, message: String, level: ToastLevel) {
        self.toast = Some(Toast {
            message,
            level,
            at: Instant::now(),
        });
    }

    fn reset_backoff(&mut self) {
        self.error_count = 0;
        self.polling_interval = self.base_polling_interval;
    }

    fn apply_backoff(&mut self) {
        let multiplier = 2u64.pow(self.error_count.min(5));
        let backoff_secs = self.base_polling_interval.as_secs() * multiplier;
        self.polling_interval = Duration::from_secs(backoff_secs.min(60));
    }

    fn page_height(&self) -> usize {
        20
    }
}
