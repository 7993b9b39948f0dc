use std::sync::Arc;

use tokio::sync::mpsc;

use crate::action::Action;
use crate::client::{AgentClient, ClientError};
use crate::dispatch::{ActionDispatcher, FailureReporter, ScheduleCallbacks, ViewToken};
use crate::domain::*;

#[derive(Debug)]
pub enum ApiRequest {
    LoadSchedules,
    LoadGraph {
        graph_id: GraphId,
        version: u32,
    },
    RunNow {
        view: ViewToken,
        graph: Box<GraphMeta>,
        schedule: Box<Schedule>,
    },
    DeleteSchedule {
        schedule: Box<Schedule>,
    },
}

#[derive(Clone)]
pub struct ApiHandle {
    tx: mpsc::UnboundedSender<ApiRequest>,
}

impl ApiHandle {
    pub fn send(&self, request: ApiRequest) {
        let _ = self.tx.send(request);
    }
}

/// The host side of the details view: forwards forced-run notices and
/// failures into the UI loop and performs deletions it is asked for.
pub struct ChannelCallbacks {
    client: Arc<dyn AgentClient>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl ChannelCallbacks {
    pub fn new(client: Arc<dyn AgentClient>, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self { client, action_tx }
    }
}

impl ScheduleCallbacks for ChannelCallbacks {
    fn on_forced_run(&self, view: ViewToken, schedule_id: &str, run_id: GraphExecutionId) {
        let _ = self.action_tx.send(Action::ForcedRun {
            view,
            schedule_id: schedule_id.to_string(),
            run_id,
        });
    }

    fn do_delete_schedule(&self, schedule_id: ScheduleId) {
        let client = self.client.clone();
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            tracing::info!("Deleting schedule {}", schedule_id);
            let action = match client.delete_schedule(&schedule_id).await {
                Ok(()) => Action::ScheduleDeleted(schedule_id),
                Err(e) => Action::Error(format!("failed to delete schedule: {}", e)),
            };
            let _ = action_tx.send(action);
        });
    }
}

impl FailureReporter for ChannelCallbacks {
    fn report_failure(&self, context: &str, error: &ClientError) {
        let _ = self.action_tx.send(Action::FailureReported {
            context: context.to_string(),
            message: error.to_string(),
        });
    }
}

pub struct ApiWorker {
    client: Arc<dyn AgentClient>,
    dispatcher: Arc<ActionDispatcher>,
    rx: mpsc::UnboundedReceiver<ApiRequest>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl ApiWorker {
    pub fn new(
        client: Arc<dyn AgentClient>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> (Self, ApiHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ApiHandle { tx };
        let callbacks = Arc::new(ChannelCallbacks::new(client.clone(), action_tx.clone()));
        let dispatcher = Arc::new(ActionDispatcher::new(
            client.clone(),
            callbacks.clone(),
            callbacks,
        ));
        let worker = Self {
            client,
            dispatcher,
            rx,
            action_tx,
        };
        (worker, handle)
    }

    pub async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            let Some(action) = self.process(request).await else {
                continue;
            };
            if self.action_tx.send(action).is_err() {
                break;
            }
        }
    }

    async fn process(&self, request: ApiRequest) -> Option<Action> {
        match request {
            ApiRequest::LoadSchedules => match self.client.list_schedules().await {
                Ok(schedules) => Some(Action::SchedulesLoaded(schedules)),
                Err(e) => Some(Action::Error(format!("failed to load schedules: {}", e))),
            },
            ApiRequest::LoadGraph { graph_id, version } => {
                match self.client.get_graph(&graph_id, Some(version)).await {
                    Ok(graph) => Some(Action::GraphLoaded(Box::new(graph))),
                    Err(e) => Some(Action::GraphLoadFailed(format!(
                        "failed to load agent {}: {}",
                        graph_id, e
                    ))),
                }
            }
            ApiRequest::RunNow {
                view,
                graph,
                schedule,
            } => {
                // Executions can take up to the request timeout; keep serving
                // loads and deletes meanwhile.
                let dispatcher = self.dispatcher.clone();
                let action_tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let outcome = dispatcher.run_now(view, &graph, &schedule).await;
                    let _ = action_tx.send(Action::RunNowSettled {
                        view,
                        schedule_id: schedule.id,
                        outcome,
                    });
                });
                None
            }
            ApiRequest::DeleteSchedule { schedule } => {
                self.dispatcher.delete_schedule(&schedule);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::Notify;

    use crate::client::fake::FakeClient;
    use crate::dispatch::RunNowOutcome;

    fn schedule() -> Box<Schedule> {
        Box::new(
            serde_json::from_value(json!({
                "id": "sch-1",
                "graph_id": "g-1",
                "graph_version": 1,
                "cron": "*/5 * * * *",
                "next_run_time": "2024-05-06T09:00:00Z",
                "input_data": {"topic": "rust"}
            }))
            .unwrap(),
        )
    }

    fn graph() -> Box<GraphMeta> {
        Box::new(serde_json::from_value(json!({"id": "g-1", "version": 1})).unwrap())
    }

    fn worker(client: FakeClient) -> (ApiWorker, mpsc::UnboundedReceiver<Action>) {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (worker, _handle) = ApiWorker::new(Arc::new(client), action_tx);
        (worker, action_rx)
    }

    fn run_now(view: u64) -> ApiRequest {
        ApiRequest::RunNow {
            view: ViewToken(view),
            graph: graph(),
            schedule: schedule(),
        }
    }

    #[tokio::test]
    async fn run_now_notifies_then_settles() {
        let (worker, mut actions) = worker(FakeClient::resolving("run-42"));

        assert!(worker.process(run_now(7)).await.is_none());

        match actions.recv().await {
            Some(Action::ForcedRun {
                view,
                schedule_id,
                run_id,
            }) => {
                assert_eq!(view, ViewToken(7));
                assert_eq!(schedule_id, "sch-1");
                assert_eq!(run_id, "run-42");
            }
            other => panic!("expected forced run, got {:?}", other),
        }
        assert!(matches!(
            actions.recv().await,
            Some(Action::RunNowSettled { view: ViewToken(7), outcome: RunNowOutcome::Started(ref id), .. }) if id == "run-42"
        ));
    }

    #[tokio::test]
    async fn run_now_failure_becomes_report() {
        let (worker, mut actions) = worker(FakeClient::rejecting());

        assert!(worker.process(run_now(1)).await.is_none());

        match actions.recv().await {
            Some(Action::FailureReported { context, .. }) => assert_eq!(context, "execute agent"),
            other => panic!("expected failure report, got {:?}", other),
        }
        assert!(matches!(
            actions.recv().await,
            Some(Action::RunNowSettled {
                outcome: RunNowOutcome::Failed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn loads_are_served_while_a_run_is_starting() {
        let gate = Arc::new(Notify::new());
        let client = Arc::new(FakeClient {
            execution_id: Some("run-1".to_string()),
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let (action_tx, mut actions) = mpsc::unbounded_channel();
        let (worker, handle) = ApiWorker::new(client.clone(), action_tx);
        tokio::spawn(worker.run());

        handle.send(run_now(1));
        handle.send(ApiRequest::LoadSchedules);

        let loaded = tokio::time::timeout(Duration::from_secs(1), actions.recv())
            .await
            .expect("load answered before the run settled");
        assert!(matches!(loaded, Some(Action::SchedulesLoaded(_))));

        while client.execution_count() == 0 {
            tokio::task::yield_now().await;
        }
        // a second run from a reopened view hits the dispatcher's guard
        handle.send(run_now(2));
        match actions.recv().await {
            Some(Action::RunNowSettled { view, outcome, .. }) => {
                assert_eq!(view, ViewToken(2));
                assert_eq!(outcome, RunNowOutcome::AlreadyPending);
            }
            other => panic!("expected rejected run, got {:?}", other),
        }

        gate.notify_one();
        assert!(matches!(
            actions.recv().await,
            Some(Action::ForcedRun { view: ViewToken(1), .. })
        ));
        assert!(matches!(
            actions.recv().await,
            Some(Action::RunNowSettled { view: ViewToken(1), outcome: RunNowOutcome::Started(_), .. })
        ));
    }

    #[tokio::test]
    async fn delete_goes_through_callbacks() {
        let (worker, mut actions) = worker(FakeClient::default());

        let direct = worker
            .process(ApiRequest::DeleteSchedule {
                schedule: schedule(),
            })
            .await;
        assert!(direct.is_none());

        match actions.recv().await {
            Some(Action::ScheduleDeleted(id)) => assert_eq!(id, "sch-1"),
            other => panic!("expected deletion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_graph_reports_load_failure() {
        let (worker, _actions) = worker(FakeClient::default());

        let action = worker
            .process(ApiRequest::LoadGraph {
                graph_id: "g-404".to_string(),
                version: 1,
            })
            .await;

        assert!(matches!(action, Some(Action::GraphLoadFailed(ref msg)) if msg.contains("g-404")));
    }
}
