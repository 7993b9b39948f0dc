use crate::details::RunActionKind;
use crate::dispatch::{RunNowOutcome, ViewToken};
use crate::domain::*;

#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    NavigateUp,
    NavigateDown,
    NavigateTop,
    NavigateBottom,
    PageUp,
    PageDown,
    Select,
    Back,

    // Vim chord
    EnterPendingG,

    // Detail actions
    RunAction(RunActionKind),
    AgentAction(AgentActionKind),

    // UI
    ConfirmOverlay,
    CloseOverlay,
    ToggleHelp,

    // Data responses
    SchedulesLoaded(Vec<Schedule>),
    GraphLoaded(Box<GraphMeta>),
    GraphLoadFailed(String),
    ForcedRun {
        view: ViewToken,
        schedule_id: ScheduleId,
        run_id: GraphExecutionId,
    },
    RunNowSettled {
        view: ViewToken,
        schedule_id: ScheduleId,
        outcome: RunNowOutcome,
    },
    ScheduleDeleted(ScheduleId),
    FailureReported {
        context: String,
        message: String,
    },

    // App control
    Refresh,
    Quit,
    Tick,
    Error(String),
}

/// Actions the host offers next to the run actions on the details screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentActionKind {
    Refresh,
    TogglePolling,
}
