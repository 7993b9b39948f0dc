use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::client::{AgentClient, ClientError};
use crate::domain::*;

/// Context attached to failures of the run-now action.
pub const EXECUTE_AGENT_CONTEXT: &str = "execute agent";

/// Identifies one opening of a schedule's details view. Completions carry
/// the token of the view that started them, so a reopened view can tell its
/// own run apart from one started before it was closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewToken(pub u64);

impl ViewToken {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Owner of schedule state. The details view never deletes or records runs
/// itself; it hands both decisions back through these hooks.
pub trait ScheduleCallbacks: Send + Sync {
    fn on_forced_run(&self, view: ViewToken, schedule_id: &str, run_id: GraphExecutionId);
    fn do_delete_schedule(&self, schedule_id: ScheduleId);
}

pub trait FailureReporter: Send + Sync {
    fn report_failure(&self, context: &str, error: &ClientError);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunNowOutcome {
    Started(GraphExecutionId),
    Failed,
    AlreadyPending,
}

pub struct ActionDispatcher {
    client: Arc<dyn AgentClient>,
    callbacks: Arc<dyn ScheduleCallbacks>,
    reporter: Arc<dyn FailureReporter>,
    in_flight: AtomicBool,
}

impl ActionDispatcher {
    pub fn new(
        client: Arc<dyn AgentClient>,
        callbacks: Arc<dyn ScheduleCallbacks>,
        reporter: Arc<dyn FailureReporter>,
    ) -> Self {
        Self {
            client,
            callbacks,
            reporter,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Starts an out-of-cycle execution of the schedule's graph with its
    /// stored inputs. At most one request is outstanding at a time.
    pub async fn run_now(
        &self,
        view: ViewToken,
        graph: &GraphMeta,
        schedule: &Schedule,
    ) -> RunNowOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("run now for schedule {} ignored: already pending", schedule.id);
            return RunNowOutcome::AlreadyPending;
        }
        let _pending = PendingGuard(&self.in_flight);

        tracing::info!(
            "Executing graph {} v{} for schedule {}",
            graph.id,
            graph.version,
            schedule.id
        );

        match self
            .client
            .execute_graph(
                &graph.id,
                graph.version,
                &schedule.input_data,
                &schedule.input_credentials,
            )
            .await
        {
            Ok(run) => {
                tracing::info!("Schedule {} started run {}", schedule.id, run.graph_exec_id);
                self.callbacks
                    .on_forced_run(view, &schedule.id, run.graph_exec_id.clone());
                RunNowOutcome::Started(run.graph_exec_id)
            }
            Err(e) => {
                tracing::warn!("failed to execute graph {}: {}", graph.id, e);
                self.reporter.report_failure(EXECUTE_AGENT_CONTEXT, &e);
                RunNowOutcome::Failed
            }
        }
    }

    pub fn delete_schedule(&self, schedule: &Schedule) {
        self.callbacks.do_delete_schedule(schedule.id.clone());
    }
}

// Clears the in-flight flag even when the request future is dropped.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;
    use tokio::sync::Notify;

    use crate::client::fake::FakeClient;

    #[derive(Default)]
    struct Recorder {
        forced_runs: Mutex<Vec<(ViewToken, String, String)>>,
        deletes: Mutex<Vec<String>>,
        failures: Mutex<Vec<(String, String)>>,
    }

    impl ScheduleCallbacks for Recorder {
        fn on_forced_run(&self, view: ViewToken, schedule_id: &str, run_id: GraphExecutionId) {
            self.forced_runs
                .lock()
                .unwrap()
                .push((view, schedule_id.to_string(), run_id));
        }

        fn do_delete_schedule(&self, schedule_id: ScheduleId) {
            self.deletes.lock().unwrap().push(schedule_id);
        }
    }

    impl FailureReporter for Recorder {
        fn report_failure(&self, context: &str, error: &ClientError) {
            self.failures
                .lock()
                .unwrap()
                .push((context.to_string(), error.to_string()));
        }
    }

    fn fixtures() -> (GraphMeta, Schedule) {
        let graph = serde_json::from_value(json!({
            "id": "g-1",
            "version": 4,
            "input_schema": {"properties": {"city": {"title": "City Name"}}}
        }))
        .unwrap();
        let schedule = serde_json::from_value(json!({
            "id": "sch-9",
            "graph_id": "g-1",
            "graph_version": 4,
            "cron": "0 9 * * 1",
            "next_run_time": "2024-05-06T09:00:00Z",
            "input_data": {"city": "Paris", "days": 3},
            "input_credentials": {"weather": {"id": "cred-1"}}
        }))
        .unwrap();
        (graph, schedule)
    }

    fn dispatcher(client: Arc<FakeClient>, recorder: Arc<Recorder>) -> ActionDispatcher {
        ActionDispatcher::new(client, recorder.clone(), recorder)
    }

    #[tokio::test]
    async fn run_now_forwards_execution_id() {
        let (graph, schedule) = fixtures();
        let client = Arc::new(FakeClient::resolving("run-42"));
        let recorder = Arc::new(Recorder::default());
        let dispatcher = dispatcher(client.clone(), recorder.clone());

        let outcome = dispatcher.run_now(ViewToken(3), &graph, &schedule).await;

        assert_eq!(outcome, RunNowOutcome::Started("run-42".to_string()));
        assert_eq!(
            *recorder.forced_runs.lock().unwrap(),
            vec![(ViewToken(3), "sch-9".to_string(), "run-42".to_string())]
        );
        assert!(recorder.failures.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_now_sends_stored_inputs_unchanged() {
        let (graph, schedule) = fixtures();
        let client = Arc::new(FakeClient::resolving("run-1"));
        let recorder = Arc::new(Recorder::default());
        let dispatcher = dispatcher(client.clone(), recorder);

        dispatcher.run_now(ViewToken(1), &graph, &schedule).await;

        let calls = client.executions.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].graph_id, "g-1");
        assert_eq!(calls[0].graph_version, 4);
        assert_eq!(calls[0].input_data, schedule.input_data);
        assert_eq!(calls[0].input_credentials, json!({"weather": {"id": "cred-1"}}));
    }

    #[tokio::test]
    async fn run_now_failure_is_reported_once() {
        let (graph, schedule) = fixtures();
        let client = Arc::new(FakeClient::rejecting());
        let recorder = Arc::new(Recorder::default());
        let dispatcher = dispatcher(client, recorder.clone());

        let outcome = dispatcher.run_now(ViewToken(1), &graph, &schedule).await;

        assert_eq!(outcome, RunNowOutcome::Failed);
        assert!(recorder.forced_runs.lock().unwrap().is_empty());
        {
            let failures = recorder.failures.lock().unwrap();
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, "execute agent");
        }

        // the guard is released after a failure
        let again = dispatcher.run_now(ViewToken(1), &graph, &schedule).await;
        assert_eq!(again, RunNowOutcome::Failed);
    }

    #[tokio::test]
    async fn second_run_now_is_rejected_while_pending() {
        let (graph, schedule) = fixtures();
        let gate = Arc::new(Notify::new());
        let client = Arc::new(FakeClient {
            execution_id: Some("run-1".to_string()),
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let recorder = Arc::new(Recorder::default());
        let dispatcher = Arc::new(dispatcher(client.clone(), recorder.clone()));

        let first = tokio::spawn({
            let dispatcher = dispatcher.clone();
            let graph = graph.clone();
            let schedule = schedule.clone();
            async move { dispatcher.run_now(ViewToken(1), &graph, &schedule).await }
        });
        while client.execution_count() == 0 {
            tokio::task::yield_now().await;
        }

        let second = dispatcher.run_now(ViewToken(2), &graph, &schedule).await;
        assert_eq!(second, RunNowOutcome::AlreadyPending);

        gate.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first, RunNowOutcome::Started("run-1".to_string()));
        assert_eq!(client.execution_count(), 1);
        assert_eq!(recorder.forced_runs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_only_calls_back() {
        let (_, schedule) = fixtures();
        let client = Arc::new(FakeClient::resolving("run-1"));
        let recorder = Arc::new(Recorder::default());
        let dispatcher = dispatcher(client.clone(), recorder.clone());

        dispatcher.delete_schedule(&schedule);

        assert_eq!(*recorder.deletes.lock().unwrap(), vec!["sch-9".to_string()]);
        assert!(recorder.forced_runs.lock().unwrap().is_empty());
        assert!(recorder.failures.lock().unwrap().is_empty());
        assert_eq!(client.execution_count(), 0);
        assert!(client.deleted.lock().unwrap().is_empty());
    }
}
