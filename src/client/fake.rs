//! In-memory client used by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{AgentClient, ClientError, ClientResult};
use crate::domain::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteCall {
    pub graph_id: String,
    pub graph_version: u32,
    pub input_data: serde_json::Map<String, serde_json::Value>,
    pub input_credentials: serde_json::Value,
}

#[derive(Default)]
pub struct FakeClient {
    pub schedules: Vec<Schedule>,
    pub graphs: Vec<GraphMeta>,
    /// `Some(id)` resolves executions with that id, `None` rejects them.
    pub execution_id: Option<String>,
    /// When set, executions wait for a notification before resolving.
    pub gate: Option<Arc<Notify>>,
    pub executions: Mutex<Vec<ExecuteCall>>,
    pub deleted: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn resolving(execution_id: &str) -> Self {
        Self {
            execution_id: Some(execution_id.to_string()),
            ..Default::default()
        }
    }

    pub fn rejecting() -> Self {
        Self::default()
    }

    pub fn execution_count(&self) -> usize {
        self.executions.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AgentClient for FakeClient {
    async fn list_schedules(&self) -> ClientResult<Vec<Schedule>> {
        Ok(self.schedules.clone())
    }

    async fn get_graph(&self, graph_id: &str, version: Option<u32>) -> ClientResult<GraphMeta> {
        self.graphs
            .iter()
            .find(|g| g.id == graph_id && version.map_or(true, |v| v == g.version))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("graph {}", graph_id)))
    }

    async fn execute_graph(
        &self,
        graph_id: &str,
        graph_version: u32,
        input_data: &serde_json::Map<String, serde_json::Value>,
        input_credentials: &serde_json::Value,
    ) -> ClientResult<GraphExecutionMeta> {
        if let Ok(mut calls) = self.executions.lock() {
            calls.push(ExecuteCall {
                graph_id: graph_id.to_string(),
                graph_version,
                input_data: input_data.clone(),
                input_credentials: input_credentials.clone(),
            });
        }
        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }
        match self.execution_id {
            Some(ref id) => Ok(GraphExecutionMeta {
                graph_exec_id: id.clone(),
            }),
            None => Err(ClientError::RequestFailed("500: graph is broken".to_string())),
        }
    }

    async fn delete_schedule(&self, schedule_id: &str) -> ClientResult<()> {
        if let Ok(mut deleted) = self.deleted.lock() {
            deleted.push(schedule_id.to_string());
        }
        Ok(())
    }
}
