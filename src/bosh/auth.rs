use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::bosh::{decode, expect_status};
use crate::error::{Error, Result};


const UAA_PORT: u16 = 8443;


#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}


/// UAA is co-located with the director on a fixed port.
pub(crate) fn token_url(director_url: &str) -> Result<String> {
    let parsed = url::Url::parse(director_url)?;
    match parsed.host_str() {
        Some(host) => Ok(token_url_for_host(host)),
        None => Err(Error::MissingHost(director_url.to_string())),
    }
}


pub(crate) fn token_url_for_host(host: &str) -> String {
    format!("https://{}:{}/oauth/token", host, UAA_PORT)
}


/// Exchanges a client id and secret for a bearer token.
pub(crate) async fn client_credentials_token(
    http: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String> {
    debug!(token_url, client_id, "requesting uaa token");
    let response = http
        .post(token_url)
        .basic_auth(client_id, Some(client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let response = expect_status(response, StatusCode::OK).await?;
    let token: TokenResponse = decode(response).await?;
    Ok(token.access_token)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_url_uses_the_director_host() {
        assert_eq!(
            token_url("https://10.0.0.6:25555").unwrap(),
            "https://10.0.0.6:8443/oauth/token"
        );
    }

    #[test]
    fn token_url_without_a_port() {
        assert_eq!(
            token_url("https://director.example.com").unwrap(),
            "https://director.example.com:8443/oauth/token"
        );
    }

    #[test]
    fn token_url_rejects_garbage() {
        assert!(token_url("%%%%").is_err());
    }
}
