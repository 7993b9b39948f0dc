use serde::{Deserialize, Serialize};

pub type GraphExecutionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRunStatus {
    Queued,
    Running,
    Completed,
    Terminated,
    Failed,
    Incomplete,
    Scheduled,
    Draft,
}

impl AgentRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Terminated => "terminated",
            Self::Failed => "failed",
            Self::Incomplete => "incomplete",
            Self::Scheduled => "scheduled",
            Self::Draft => "draft",
        }
    }
}

impl std::fmt::Display for AgentRunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Descriptor returned when an execution is queued.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawExecutionMeta")]
pub struct GraphExecutionMeta {
    pub graph_exec_id: GraphExecutionId,
}

// Older backends only send the execution id as `id`; newer ones send both.
#[derive(Deserialize)]
struct RawExecutionMeta {
    #[serde(default)]
    graph_exec_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

impl TryFrom<RawExecutionMeta> for GraphExecutionMeta {
    type Error = String;

    fn try_from(raw: RawExecutionMeta) -> Result<Self, Self::Error> {
        raw.graph_exec_id
            .or(raw.id)
            .map(|graph_exec_id| Self { graph_exec_id })
            .ok_or_else(|| "execution descriptor has no graph_exec_id".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn execution_meta_accepts_both_id_fields() {
        let current: GraphExecutionMeta =
            serde_json::from_value(json!({"graph_exec_id": "run-42", "id": "other"}))
                .expect("current shape");
        assert_eq!(current.graph_exec_id, "run-42");

        let legacy: GraphExecutionMeta =
            serde_json::from_value(json!({"id": "run-7"})).expect("legacy shape");
        assert_eq!(legacy.graph_exec_id, "run-7");

        assert!(serde_json::from_value::<GraphExecutionMeta>(json!({})).is_err());
    }

    #[test]
    fn status_tag_is_lowercase() {
        assert_eq!(AgentRunStatus::Scheduled.as_str(), "scheduled");
        assert_eq!(
            serde_json::to_value(AgentRunStatus::Running).expect("serialize"),
            json!("running")
        );
    }
}
