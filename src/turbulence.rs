//! Client for the Turbulence fault-injection API.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::bosh::{decode, expect_status};
use crate::error::{Error, Result};
use crate::poll::Poll;


pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);


#[derive(Clone, Debug, Default)]
pub struct Config {
    pub url: String,
    pub poll_interval: Duration,
    /// Give up on an incident after this long. Polls forever when unset.
    pub timeout: Option<Duration>,
}


#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IncidentRequest {
    pub tasks: Vec<IncidentTask>,
    pub deployments: Vec<IncidentDeployment>,
}


#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IncidentTask {
    #[serde(rename = "Type")]
    pub kind: String,
}


#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IncidentDeployment {
    pub name: String,
    pub jobs: Vec<IncidentJob>,
}


#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IncidentJob {
    pub name: String,
    pub indices: Vec<u32>,
}


#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Incident {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "ExecutionStartedAt", default)]
    pub execution_started_at: String,
    #[serde(rename = "ExecutionCompletedAt", default)]
    pub execution_completed_at: String,
    #[serde(rename = "Events", default)]
    pub events: Option<Vec<IncidentEvent>>,
}

impl Incident {
    pub fn is_complete(&self) -> bool {
        !self.execution_completed_at.is_empty()
    }

    /// First error reported by any of the incident's events.
    pub fn error(&self) -> Option<&str> {
        self.events
            .iter()
            .flatten()
            .map(|event| event.error.as_str())
            .find(|error| !error.is_empty())
    }
}


#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IncidentEvent {
    #[serde(default)]
    pub error: String,
}


impl IncidentRequest {
    pub fn kill(deployment: &str, job: &str, indices: &[u32]) -> Self {
        Self {
            tasks: vec![IncidentTask { kind: "kill".to_string() }],
            deployments: vec![IncidentDeployment {
                name: deployment.to_string(),
                jobs: vec![IncidentJob {
                    name: job.to_string(),
                    indices: indices.to_vec(),
                }],
            }],
        }
    }
}


#[derive(Clone, Debug)]
pub struct Client {
    config: Config,
    http: reqwest::Client,
}

impl Client {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_config(Config {
            url: url.into(),
            ..Config::default()
        })
    }

    pub fn with_config(mut config: Config) -> Self {
        if config.poll_interval.is_zero() {
            config.poll_interval = DEFAULT_POLL_INTERVAL;
        }

        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn create_incident(&self, request: &IncidentRequest) -> Result<Incident> {
        let response = self.http
            .post(format!("{}/api/v1/incidents", self.config.url))
            .json(request)
            .send()
            .await?;

        let response = expect_status(response, StatusCode::OK).await?;
        decode(response).await
    }

    pub async fn incident(&self, id: &str) -> Result<Incident> {
        let response = self.http
            .get(format!("{}/api/v1/incidents/{}", self.config.url, id))
            .send()
            .await?;

        let response = expect_status(response, StatusCode::OK).await?;
        decode(response).await
    }

    /// Polls the incident until it completes and fails if any of its events
    /// reported an error.
    pub async fn wait_for_incident(&self, id: &str) -> Result<Incident> {
        let poll = Poll::start(self.config.poll_interval, self.config.timeout);

        loop {
            let incident = self.incident(id).await?;
            debug!(id, completed_at = %incident.execution_completed_at, "polled incident");

            if incident.is_complete() {
                if let Some(error) = incident.error() {
                    return Err(Error::IncidentFailed {
                        id: incident.id.clone(),
                        message: error.to_string(),
                    });
                }

                info!(id, "incident complete");
                return Ok(incident);
            }

            poll.wait().await?;
        }
    }

    /// Kills the given instances of one job and waits for the kill to finish.
    pub async fn kill_indices(&self, deployment: &str, job: &str, indices: &[u32]) -> Result<()> {
        let incident = self.create_incident(&IncidentRequest::kill(deployment, job, indices)).await?;
        info!(id = %incident.id, deployment, job, ?indices, "created kill incident");
        self.wait_for_incident(&incident.id).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_request_shape() {
        let request = IncidentRequest::kill("deployment-name", "job-name", &[0]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "Tasks": [{ "Type": "kill" }],
                "Deployments": [{
                    "Name": "deployment-name",
                    "Jobs": [{ "Name": "job-name", "Indices": [0] }]
                }]
            })
        );
    }

    #[test]
    fn incident_with_null_events() {
        let incident: Incident = serde_json::from_str(r#"{
            "ID": "someID",
            "ExecutionStartedAt": "0001-01-01T00:00:00Z",
            "ExecutionCompletedAt": "",
            "Events": null
        }"#).unwrap();

        assert!(!incident.is_complete());
        assert_eq!(incident.error(), None);
    }

    #[test]
    fn incident_error_skips_empty_errors() {
        let incident = Incident {
            id: "someID".to_string(),
            execution_completed_at: "0001-01-01T00:01:00Z".to_string(),
            events: Some(vec![
                IncidentEvent { error: String::new() },
                IncidentEvent { error: "vm not found".to_string() },
            ]),
            ..Incident::default()
        };

        assert!(incident.is_complete());
        assert_eq!(incident.error(), Some("vm not found"));
    }

    #[test]
    fn new_defaults_the_poll_interval() {
        let client = Client::new("http://turbulence");
        assert_eq!(client.config().poll_interval, DEFAULT_POLL_INTERVAL);
    }
}
