use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::bosh::upload::location;
use crate::bosh::{expect_status, Client};
use crate::error::Result;


#[derive(Debug, Deserialize)]
struct ScanManifest {
    name: String,
    #[serde(default)]
    jobs: Vec<ScanJob>,
}


#[derive(Debug, Deserialize)]
struct ScanJob {
    name: String,
    #[serde(default)]
    instances: i64,
}


/// Every instance index of every job that has instances.
fn job_indices(jobs: &[ScanJob]) -> BTreeMap<String, Vec<i64>> {
    jobs.iter()
        .filter(|job| job.instances > 0)
        .map(|job| (job.name.clone(), (0..job.instances).collect()))
        .collect()
}


impl Client {
    /// Runs cloud check on every instance of the manifest's deployment and
    /// waits for the resulting task.
    pub async fn scan_and_fix(&self, manifest: &str) -> Result<u64> {
        let manifest: ScanManifest = serde_yaml::from_str(manifest)?;
        let body = serde_json::to_vec(&serde_json::json!({
            "jobs": job_indices(&manifest.jobs),
        }))?;

        let url = self.url_for(&["deployments", &manifest.name, "scan_and_fix"])?;
        let request = self.http
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        let response = self.send(request).await?;
        let response = expect_status(response, StatusCode::FOUND).await?;
        self.wait_for_task(&location(&response)?).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_indices_skips_jobs_without_instances() {
        let manifest: ScanManifest = serde_yaml::from_str(
            "name: some-deployment\njobs:\n- name: a\n  instances: 3\n- name: b\n  instances: 0\n"
        ).unwrap();

        let body = serde_json::json!({ "jobs": job_indices(&manifest.jobs) });
        assert_eq!(body, serde_json::json!({ "jobs": { "a": [0, 1, 2] } }));
    }

    #[test]
    fn job_indices_of_no_jobs_is_empty() {
        assert!(job_indices(&[]).is_empty());
    }
}
