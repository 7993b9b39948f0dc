//! View-model for the schedule details screen.
//!
//! Everything here is recomputed from the current schedule and graph on
//! every render; nothing is cached between frames.

use std::fmt::Display;

use chrono::TimeZone;

use crate::cron::CronHumanizer;
use crate::domain::*;

/// Status shown for every schedule, independent of how its runs went.
pub const SCHEDULE_STATUS: AgentRunStatus = AgentRunStatus::Scheduled;

const NEXT_RUN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoStat {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub key: String,
    pub title: String,
    pub value: serde_json::Value,
}

impl InputField {
    pub fn display_value(&self) -> String {
        match &self.value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunActionKind {
    RunNow,
    DeleteSchedule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton<A> {
    pub action: A,
    pub label: &'static str,
    pub key: char,
    pub variant: ActionVariant,
    pub enabled: bool,
}

pub fn summary_stats<Tz>(
    schedule: &Schedule,
    status: AgentRunStatus,
    humanizer: &dyn CronHumanizer,
    tz: &Tz,
) -> [InfoStat; 3]
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    [
        InfoStat {
            label: "Status",
            value: capitalize(status.as_str()),
        },
        InfoStat {
            label: "Schedule",
            value: humanizer.humanize(&schedule.cron),
        },
        InfoStat {
            label: "Next run",
            value: schedule
                .next_run_time
                .with_timezone(tz)
                .format(NEXT_RUN_FORMAT)
                .to_string(),
        },
    ]
}

/// Pairs every stored input with the title its graph declares for it, in
/// the order the inputs were stored.
pub fn reconcile_inputs(graph: &GraphMeta, schedule: &Schedule) -> Vec<InputField> {
    schedule
        .input_data
        .iter()
        .map(|(key, value)| {
            if !graph.input_schema.contains(key) {
                tracing::warn!(
                    "schedule {} input {} is not in the input schema of graph {} v{}",
                    schedule.id,
                    key,
                    graph.id,
                    graph.version
                );
            }
            InputField {
                key: key.clone(),
                title: graph
                    .input_schema
                    .title_for(key)
                    .unwrap_or_else(|| key.clone()),
                value: value.clone(),
            }
        })
        .collect()
}

pub fn run_actions(run_pending: bool) -> [ActionButton<RunActionKind>; 2] {
    [
        ActionButton {
            action: RunActionKind::RunNow,
            label: if run_pending { "Running…" } else { "Run now" },
            key: 'r',
            variant: ActionVariant::Default,
            enabled: !run_pending,
        },
        ActionButton {
            action: RunActionKind::DeleteSchedule,
            label: "Delete schedule",
            key: 'd',
            variant: ActionVariant::Destructive,
            enabled: true,
        },
    ]
}

pub fn run_action_for_key(key: char) -> Option<RunActionKind> {
    run_actions(false)
        .into_iter()
        .find(|button| button.key == key)
        .map(|button| button.action)
}

/// Everything the details screen draws for one schedule. `inputs` stays
/// `None` until the schedule's graph has loaded.
#[derive(Debug, Clone)]
pub struct ScheduleDetails {
    pub stats: [InfoStat; 3],
    pub inputs: Option<Vec<InputField>>,
    pub run_actions: [ActionButton<RunActionKind>; 2],
}

impl ScheduleDetails {
    pub fn derive<Tz>(
        graph: Option<&GraphMeta>,
        schedule: &Schedule,
        humanizer: &dyn CronHumanizer,
        tz: &Tz,
        run_pending: bool,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            stats: summary_stats(schedule, SCHEDULE_STATUS, humanizer, tz),
            inputs: graph.map(|graph| reconcile_inputs(graph, schedule)),
            run_actions: run_actions(run_pending),
        }
    }
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
