use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::bosh::{decode, expect_status, Client};
use crate::error::Result;


#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct DirectorInfo {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub cpi: String,
}


impl Client {
    pub async fn info(&self) -> Result<DirectorInfo> {
        let response = self.send(self.http.get(self.url("/info"))).await?;
        let response = expect_status(response, StatusCode::OK).await?;
        decode(response).await
    }
}
