use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GraphId;

pub type ScheduleId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    #[serde(default)]
    pub name: String,
    pub graph_id: GraphId,
    pub graph_version: u32,
    pub cron: String,
    pub next_run_time: DateTime<Utc>,
    #[serde(default)]
    pub input_data: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub input_credentials: serde_json::Value,
}

impl Schedule {
    /// Name shown in lists; falls back to the id for unnamed schedules.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
