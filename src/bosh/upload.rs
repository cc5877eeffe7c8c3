use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{Body, Response, StatusCode};
use tracing::info;

use crate::bosh::{expect_status, Client};
use crate::error::{Error, Result};


const COMPRESSED: &str = "application/x-compressed";


impl Client {
    /// Uploads a release tarball and waits for the director to import it.
    pub async fn upload_release(
        &self,
        release: impl Into<Body>,
        content_length: u64,
    ) -> Result<u64> {
        self.upload("/releases", release.into(), content_length).await
    }

    /// Uploads a stemcell tarball and waits for the director to import it.
    pub async fn upload_stemcell(
        &self,
        stemcell: impl Into<Body>,
        content_length: u64,
    ) -> Result<u64> {
        self.upload("/stemcells", stemcell.into(), content_length).await
    }

    async fn upload(&self, path: &str, body: Body, content_length: u64) -> Result<u64> {
        info!(path, content_length, "uploading to director");
        let request = self.http
            .post(self.url(path))
            .header(CONTENT_TYPE, COMPRESSED)
            .header(CONTENT_LENGTH, content_length)
            .body(body);

        let response = self.send(request).await?;
        let response = expect_status(response, StatusCode::FOUND).await?;
        self.wait_for_task(&location(&response)?).await
    }
}


pub(crate) fn location(response: &Response) -> Result<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|location| location.to_str().ok())
        .map(str::to_string)
        .ok_or(Error::MissingLocation)
}
