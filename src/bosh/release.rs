use reqwest::StatusCode;
use serde::Deserialize;

use crate::bosh::{decode, expect_status, version, Client};
use crate::error::{Error, Result};


#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Release {
    pub name: String,
    pub versions: Vec<String>,
}

impl Release {
    pub fn latest(&self) -> Result<String> {
        version::latest(&self.versions).ok_or(Error::NoVersions("release"))
    }
}


#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    #[serde(default)]
    versions: Vec<String>,
}


impl Client {
    pub async fn release(&self, name: &str) -> Result<Release> {
        let url = self.url_for(&["releases", name])?;
        let response = self.send(self.http.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::ReleaseNotFound(name.to_string()));
        }

        let response = expect_status(response, StatusCode::OK).await?;
        let release: ReleaseResponse = decode(response).await?;
        Ok(Release {
            name: name.to_string(),
            versions: release.versions,
        })
    }
}
