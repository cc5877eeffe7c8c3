use reqwest::StatusCode;
use std::time::Duration;


pub type Result<T> = std::result::Result<T, Error>;


#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    #[error("url {0} has no host")]
    MissingHost(String),

    #[error("director response has no Location header")]
    MissingLocation,

    #[error("invalid director CA certificate: {0}")]
    Certificate(reqwest::Error),

    #[error("unexpected response {status}{}", body_suffix(.body))]
    UnexpectedResponse { status: StatusCode, body: String },

    #[error("{message}")]
    TaskFailed { id: u64, message: String },

    #[error("bosh task was cancelled")]
    TaskCancelled { id: u64 },

    #[error("failed to get full bosh task event log, bosh task failed with an {state} status {result:?}")]
    TaskOutput {
        id: u64,
        state: String,
        result: String,
        #[source]
        source: Box<Error>,
    },

    #[error("release {0} could not be found")]
    ReleaseNotFound(String),

    #[error("stemcell {0} could not be found")]
    StemcellNotFound(String),

    #[error("no {0} versions found, cannot get latest")]
    NoVersions(&'static str),

    #[error("incident {id} failed: {message}")]
    IncidentFailed { id: String, message: String },

    #[error("gave up polling after {elapsed:?}")]
    PollTimeout { elapsed: Duration },
}

impl Error {
    /// Director task id for task failures, if any.
    pub fn task_id(&self) -> Option<u64> {
        match self {
            Error::TaskFailed { id, .. }
            | Error::TaskCancelled { id }
            | Error::TaskOutput { id, .. } => Some(*id),
            _ => None,
        }
    }
}


fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(":\n{}", body)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_response_without_body() {
        let err = Error::UnexpectedResponse {
            status: StatusCode::IM_A_TEAPOT,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "unexpected response 418 I'm a teapot");
    }

    #[test]
    fn unexpected_response_with_body() {
        let err = Error::UnexpectedResponse {
            status: StatusCode::BAD_GATEWAY,
            body: "More Info".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected response 502 Bad Gateway:\nMore Info");
    }

    #[test]
    fn task_output_failure_quotes_result() {
        let err = Error::TaskOutput {
            id: 7,
            state: "errored".to_string(),
            result: "some-result".to_string(),
            source: Box::new(Error::TaskCancelled { id: 7 }),
        };
        assert_eq!(
            err.to_string(),
            "failed to get full bosh task event log, bosh task failed with an errored status \"some-result\""
        );
        assert_eq!(err.task_id(), Some(7));
    }

    #[test]
    fn no_versions_names_the_kind() {
        assert_eq!(
            Error::NoVersions("stemcell").to_string(),
            "no stemcell versions found, cannot get latest"
        );
    }
}
