use clap::Parser;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::bosh;
use crate::command::{Cli, Command, Director};
use crate::error::Error;
use crate::turbulence;


pub async fn run() -> Result<(), Error> {
    let args = Cli::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Deployments { director } => {
            for deployment in client(&director)?.deployments().await? {
                println!("{}", deployment.name);
            }
        }
        Command::Info { director } => {
            let info = client(&director)?.info().await?;
            println!("uuid: {}\ncpi: {}", info.uuid, info.cpi);
        }
        Command::UploadRelease { director, filename } => {
            let (file, length) = open(&filename).await?;
            let task = client(&director)?.upload_release(file, length).await?;
            info!(task, "uploaded release {}", filename.display());
        }
        Command::UploadStemcell { director, filename } => {
            let (file, length) = open(&filename).await?;
            let task = client(&director)?.upload_stemcell(file, length).await?;
            info!(task, "uploaded stemcell {}", filename.display());
        }
        Command::ScanAndFix { director, manifest } => {
            let manifest = tokio::fs::read_to_string(manifest).await?;
            let task = client(&director)?.scan_and_fix(&manifest).await?;
            info!(task, "scan and fix finished");
        }
        Command::UpdateCloudConfig { director, filename } => {
            let cloud_config = tokio::fs::read_to_string(filename).await?;
            client(&director)?.update_cloud_config(cloud_config).await?;
        }
        Command::ResolveManifest { director, manifest } => {
            let manifest = tokio::fs::read_to_string(manifest).await?;
            print!("{}", client(&director)?.resolve_manifest_versions(&manifest).await?);
        }
        Command::KillIndices { turbulence_url, poll_interval, deployment, job, indices } => {
            let client = turbulence::Client::with_config(turbulence::Config {
                url: turbulence_url,
                poll_interval: poll_interval.unwrap_or_default(),
                timeout: None,
            });
            client.kill_indices(&deployment, &job, &indices).await?;
        }
    }

    Ok(())
}


fn init_logging(verbose: bool) {
    let default = if verbose { "bosh_test=debug" } else { "bosh_test=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}


fn client(director: &Director) -> Result<bosh::Client, Error> {
    bosh::Client::new(director.config()?)
}


async fn open(path: &Path) -> Result<(tokio::fs::File, u64), Error> {
    let file = tokio::fs::File::open(path).await?;
    let length = file.metadata().await?.len();
    Ok((file, length))
}
