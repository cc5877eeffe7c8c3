use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use crate::bosh::{expect_status, Client};
use crate::error::Result;


impl Client {
    pub async fn update_cloud_config(&self, cloud_config: impl Into<String>) -> Result<()> {
        let request = self.http
            .post(self.url("/cloud_configs"))
            .header(CONTENT_TYPE, "text/yaml")
            .body(cloud_config.into());

        let response = self.send(request).await?;
        expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }
}
