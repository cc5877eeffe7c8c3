use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::bosh::{decode, expect_status, Client};
use crate::error::Result;


#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Deployment {
    pub name: String,
}


impl Client {
    pub async fn deployments(&self) -> Result<Vec<Deployment>> {
        let response = self.send(self.http.get(self.url("/deployments"))).await?;
        let response = expect_status(response, StatusCode::OK).await?;
        decode(response).await
    }
}
