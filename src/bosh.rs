//! Client for the BOSH director REST API.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

mod auth;
mod cloud_config;
mod deployments;
mod info;
mod manifest;
mod release;
mod scan_and_fix;
mod stemcell;
mod task;
mod upload;
mod version;

pub use deployments::Deployment;
pub use info::DirectorInfo;
pub use release::Release;
pub use stemcell::Stemcell;
pub use task::{Task, TaskEvent, TaskState};


pub const DEFAULT_TASK_POLLING_INTERVAL: Duration = Duration::from_secs(5);


#[derive(Clone, Debug, Default)]
pub struct Config {
    pub url: String,
    /// Director hostname used for UAA when it differs from the one in `url`.
    pub host: String,
    pub director_ca_cert: String,
    pub username: String,
    pub password: String,
    pub task_polling_interval: Duration,
    /// Give up on a task after this long. Polls forever when unset.
    pub task_timeout: Option<Duration>,
    pub allow_insecure_ssl: bool,
    /// Replaces the HTTP client built from the settings above. It must not
    /// follow redirects, or uploads will never observe `302 Found`.
    pub http_client: Option<reqwest::Client>,
    /// Authenticate with UAA client credentials instead of basic auth.
    pub uaa: bool,
    /// Defaults to `https://<director host>:8443/oauth/token`.
    pub uaa_token_url: Option<String>,
}


#[derive(Clone, Debug)]
pub struct Client {
    config: Config,
    http: reqwest::Client,
}

impl Client {
    pub fn new(mut config: Config) -> Result<Self> {
        if config.task_polling_interval.is_zero() {
            config.task_polling_interval = DEFAULT_TASK_POLLING_INTERVAL;
        }
        config.url = config.url.trim_end_matches('/').to_string();

        let http = match config.http_client.clone() {
            Some(http) => http,
            None => build_http_client(&config)?,
        };

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url, path)
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn url_for(&self, segments: &[&str]) -> Result<String> {
        let mut url = url::Url::parse(&self.config.url)?;
        url.path_segments_mut()
            .map_err(|()| Error::MissingHost(self.config.url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Points a director-supplied URL back at the configured base URL,
    /// keeping only its path and query.
    fn rewrite_url(&self, location: &str) -> Result<String> {
        let path = match url::Url::parse(location) {
            Ok(parsed) => match parsed.query() {
                Some(query) => format!("{}?{}", parsed.path(), query),
                None => parsed.path().to_string(),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => location.to_string(),
            Err(err) => return Err(err.into()),
        };

        Ok(self.url(&path))
    }

    /// Applies the configured credentials to `request` and sends it.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = if self.config.uaa {
            let token_url = self.token_url()?;
            let token = auth::client_credentials_token(
                &self.http,
                &token_url,
                &self.config.username,
                &self.config.password,
            ).await?;
            request.bearer_auth(token)
        } else {
            request.basic_auth(&self.config.username, Some(&self.config.password))
        };

        let request = request.build()?;
        debug!(method = %request.method(), url = %request.url(), "director request");
        Ok(self.http.execute(request).await?)
    }

    fn token_url(&self) -> Result<String> {
        match self.config.uaa_token_url {
            Some(ref token_url) => Ok(token_url.clone()),
            None if !self.config.host.is_empty() => {
                Ok(auth::token_url_for_host(&self.config.host))
            }
            None => auth::token_url(&self.config.url),
        }
    }
}


fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none());

    if config.allow_insecure_ssl {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if !config.director_ca_cert.is_empty() {
        let cert = reqwest::Certificate::from_pem(config.director_ca_cert.as_bytes())
            .map_err(Error::Certificate)?;
        builder = builder.add_root_certificate(cert);
    }

    Ok(builder.build()?)
}


/// Passes `response` through when it carries `expected`, otherwise turns it
/// into an error holding the status and body.
pub(crate) async fn expect_status(
    response: Response,
    expected: StatusCode,
) -> Result<Response> {
    if response.status() == expected {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await?;
    Err(Error::UnexpectedResponse { status, body })
}


pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
