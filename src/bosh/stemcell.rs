use reqwest::StatusCode;
use serde::Deserialize;

use crate::bosh::{decode, expect_status, version, Client};
use crate::error::{Error, Result};


/// Every version of one stemcell the director knows about, in the order
/// the director listed them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stemcell {
    pub name: String,
    pub versions: Vec<String>,
}

impl Stemcell {
    pub fn latest(&self) -> Result<String> {
        version::latest(&self.versions).ok_or(Error::NoVersions("stemcell"))
    }
}


#[derive(Debug, Deserialize)]
struct StemcellResponse {
    name: String,
    version: String,
}


impl Client {
    pub async fn stemcell(&self, name: &str) -> Result<Stemcell> {
        let response = self.send(self.http.get(self.url("/stemcells"))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::StemcellNotFound(name.to_string()));
        }

        let response = expect_status(response, StatusCode::OK).await?;
        let stemcells: Vec<StemcellResponse> = decode(response).await?;

        Ok(Stemcell {
            name: name.to_string(),
            versions: stemcells
                .into_iter()
                .filter(|stemcell| stemcell.name == name)
                .map(|stemcell| stemcell.version)
                .collect(),
        })
    }
}
