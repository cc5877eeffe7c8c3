use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::bosh::Client;
use crate::error::Result;


const LATEST: &str = "latest";


// The versioned paths read as typed strings, so a pin such as `3421.10`
// keeps its source text instead of becoming the float `3421.1`.
#[derive(Debug, Default, Deserialize)]
struct VersionPaths {
    #[serde(default)]
    releases: Vec<Pinned>,
    #[serde(default)]
    resource_pools: Vec<ResourcePool>,
}


#[derive(Debug, Default, Deserialize)]
struct ResourcePool {
    #[serde(default)]
    stemcell: Option<Pinned>,
}


#[derive(Debug, Default, Deserialize)]
struct Pinned {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}


fn entries_mut<'a>(manifest: &'a mut Value, key: &str) -> impl Iterator<Item = &'a mut Mapping> {
    manifest
        .get_mut(key)
        .and_then(Value::as_sequence_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_mapping_mut)
}


impl Client {
    /// Replaces every `latest` release and resource pool stemcell version in
    /// `manifest` with the newest version uploaded to the director. All other
    /// content is carried through unchanged.
    pub async fn resolve_manifest_versions(&self, manifest: &str) -> Result<String> {
        let mut tree: Value = serde_yaml::from_str(manifest)?;
        if !tree.is_mapping() {
            return Ok(serde_yaml::to_string(&tree)?);
        }
        let paths: VersionPaths = serde_yaml::from_str(manifest)?;

        for (release, pinned) in entries_mut(&mut tree, "releases").zip(&paths.releases) {
            let Some(ref version) = pinned.version else {
                continue;
            };

            let version = if version == LATEST {
                let name = pinned.name.clone().unwrap_or_default();
                let resolved = self.release(&name).await?.latest()?;
                debug!(release = %name, version = %resolved, "resolved latest release");
                resolved
            } else {
                version.clone()
            };
            release.insert("version".into(), Value::String(version));
        }

        let stemcells = paths.resource_pools.iter().map(|pool| pool.stemcell.as_ref());
        for (pool, pinned) in entries_mut(&mut tree, "resource_pools").zip(stemcells) {
            let Some(stemcell) = pool.get_mut("stemcell").and_then(Value::as_mapping_mut) else {
                continue;
            };
            let Some(version) = pinned.and_then(|pinned| pinned.version.as_ref()) else {
                continue;
            };

            let version = if version == LATEST {
                let name = pinned.and_then(|p| p.name.clone()).unwrap_or_default();
                let resolved = self.stemcell(&name).await?.latest()?;
                debug!(stemcell = %name, version = %resolved, "resolved latest stemcell");
                resolved
            } else {
                version.clone()
            };
            stemcell.insert("version".into(), Value::String(version));
        }

        Ok(serde_yaml::to_string(&tree)?)
    }
}
