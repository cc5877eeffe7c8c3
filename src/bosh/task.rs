use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::bosh::{decode, expect_status, Client};
use crate::error::{Error, Result};
use crate::poll::Poll;


#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Task {
    pub id: u64,
    pub state: TaskState,
    #[serde(default)]
    pub result: Option<String>,
}


/// Director task states. Anything unrecognised is treated as still running
/// and keeps the state the director reported.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    Queued,
    Processing,
    Cancelling,
    Done,
    Error,
    Errored,
    Cancelled,
    Other(String),
}

impl TaskState {
    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Processing => "processing",
            TaskState::Cancelling => "cancelling",
            TaskState::Done => "done",
            TaskState::Error => "error",
            TaskState::Errored => "errored",
            TaskState::Cancelled => "cancelled",
            TaskState::Other(state) => state,
        }
    }
}

impl From<String> for TaskState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "queued" => TaskState::Queued,
            "processing" => TaskState::Processing,
            "cancelling" => TaskState::Cancelling,
            "done" => TaskState::Done,
            "error" => TaskState::Error,
            "errored" => TaskState::Errored,
            "cancelled" => TaskState::Cancelled,
            _ => TaskState::Other(state),
        }
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Other(state) => state,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// One line of a task's event log.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct TaskEvent {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default, deserialize_with = "event_error")]
    pub error: String,
}


// The director reports either a bare message or `{"code": .., "message": ..}`.
fn event_error<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawError {
        Message(String),
        Detail { message: String },
    }

    Ok(match Option::<RawError>::deserialize(deserializer)? {
        Some(RawError::Message(message)) | Some(RawError::Detail { message }) => message,
        None => String::new(),
    })
}


impl Client {
    pub async fn task(&self, location: &str) -> Result<Task> {
        let location = self.rewrite_url(location)?;
        let response = self.send(self.http.get(location)).await?;
        let response = expect_status(response, StatusCode::OK).await?;
        decode(response).await
    }

    pub async fn task_output(&self, id: u64) -> Result<Vec<TaskEvent>> {
        let url = self.url(&format!("/tasks/{}/output?type=event", id));
        let response = self.send(self.http.get(url)).await?;
        let response = expect_status(response, StatusCode::OK).await?;
        let body = response.text().await?;

        let mut events = vec![];
        for line in body.lines().filter(|line| !line.trim().is_empty()) {
            events.push(serde_json::from_str(line)?);
        }

        Ok(events)
    }

    /// Polls the task at `location` until it finishes, returning its id.
    pub async fn wait_for_task(&self, location: &str) -> Result<u64> {
        let poll = Poll::start(
            self.config.task_polling_interval,
            self.config.task_timeout,
        );

        loop {
            let task = self.task(location).await?;
            debug!(id = task.id, state = %task.state, "polled bosh task");

            match task.state {
                TaskState::Done => {
                    info!(id = task.id, "bosh task done");
                    return Ok(task.id);
                }
                TaskState::Error | TaskState::Errored => {
                    return Err(self.task_failure(&task).await);
                }
                TaskState::Cancelled => {
                    return Err(Error::TaskCancelled { id: task.id });
                }
                _ => poll.wait().await?,
            }
        }
    }

    async fn task_failure(&self, task: &Task) -> Error {
        let result = task.result.clone().unwrap_or_default();

        match self.task_output(task.id).await {
            Ok(events) => {
                let message = match events.last() {
                    Some(event) => event.error.clone(),
                    None => result,
                };
                info!(id = task.id, state = %task.state, %message, "bosh task failed");
                Error::TaskFailed { id: task.id, message }
            }
            Err(err) => {
                warn!(id = task.id, error = %err, "could not fetch bosh task event log");
                Error::TaskOutput {
                    id: task.id,
                    state: task.state.to_string(),
                    result,
                    source: Box::new(err),
                }
            }
        }
    }
}
