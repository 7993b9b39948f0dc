use async_trait::async_trait;
use thiserror::Error;

use crate::domain::*;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("config error: {0}")]
    ConfigError(String),
    #[error("timeout")]
    Timeout,
}

pub type ClientResult<T> = Result<T, ClientError>;

#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn list_schedules(&self) -> ClientResult<Vec<Schedule>>;

    async fn get_graph(&self, graph_id: &str, version: Option<u32>) -> ClientResult<GraphMeta>;

    async fn execute_graph(
        &self,
        graph_id: &str,
        graph_version: u32,
        input_data: &serde_json::Map<String, serde_json::Value>,
        input_credentials: &serde_json::Value,
    ) -> ClientResult<GraphExecutionMeta>;

    async fn delete_schedule(&self, schedule_id: &str) -> ClientResult<()>;
}
