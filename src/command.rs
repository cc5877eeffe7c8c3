use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::bosh;

mod run;

pub use run::run;


#[derive(Debug, Parser)]
#[command(name = "bosh-test", about = "Drive a BOSH director and Turbulence from tests")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}


#[derive(Debug, Subcommand)]
pub enum Command {
    /// List deployments
    Deployments {
        #[command(flatten)]
        director: Director,
    },
    /// Show the director's UUID and CPI
    Info {
        #[command(flatten)]
        director: Director,
    },
    /// Upload a release tarball
    UploadRelease {
        #[command(flatten)]
        director: Director,
        filename: PathBuf,
    },
    /// Upload a stemcell tarball
    UploadStemcell {
        #[command(flatten)]
        director: Director,
        filename: PathBuf,
    },
    /// Scan and fix every instance of a deployment manifest
    ScanAndFix {
        #[command(flatten)]
        director: Director,
        manifest: PathBuf,
    },
    /// Replace the director's cloud config
    UpdateCloudConfig {
        #[command(flatten)]
        director: Director,
        filename: PathBuf,
    },
    /// Print a manifest with `latest` versions resolved
    ResolveManifest {
        #[command(flatten)]
        director: Director,
        manifest: PathBuf,
    },
    /// Kill job instances through Turbulence
    KillIndices {
        #[arg(long, env = "TURBULENCE_URL")]
        turbulence_url: String,
        #[arg(long, value_parser = parse_seconds)]
        poll_interval: Option<Duration>,
        deployment: String,
        job: String,
        #[arg(required = true)]
        indices: Vec<u32>,
    },
}


#[derive(Clone, Debug, Args)]
pub struct Director {
    #[arg(long, env = "BOSH_URL")]
    pub url: String,
    /// Director hostname, when it differs from the one in --url
    #[arg(long, env = "BOSH_HOST", default_value = "")]
    pub host: String,
    #[arg(long, env = "BOSH_USERNAME", default_value = "")]
    pub username: String,
    #[arg(long, env = "BOSH_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,
    #[arg(long, env = "BOSH_CA_CERT")]
    pub ca_cert: Option<PathBuf>,
    #[arg(long)]
    pub insecure: bool,
    #[arg(long, env = "BOSH_UAA")]
    pub uaa: bool,
    #[arg(long, env = "BOSH_UAA_TOKEN_URL")]
    pub uaa_token_url: Option<String>,
    /// Seconds between task polls
    #[arg(long, value_parser = parse_seconds)]
    pub poll_interval: Option<Duration>,
    /// Seconds to wait for a task before giving up
    #[arg(long, value_parser = parse_seconds)]
    pub task_timeout: Option<Duration>,
}

impl Director {
    pub fn config(&self) -> Result<bosh::Config, std::io::Error> {
        let director_ca_cert = match self.ca_cert {
            Some(ref path) => std::fs::read_to_string(path)?,
            None => String::new(),
        };

        Ok(bosh::Config {
            url: self.url.clone(),
            host: self.host.clone(),
            director_ca_cert,
            username: self.username.clone(),
            password: self.password.clone(),
            task_polling_interval: self.poll_interval.unwrap_or_default(),
            task_timeout: self.task_timeout,
            allow_insecure_ssl: self.insecure,
            uaa: self.uaa,
            uaa_token_url: self.uaa_token_url.clone(),
            ..bosh::Config::default()
        })
    }
}


fn parse_seconds(arg: &str) -> Result<Duration, String> {
    arg.parse::<f64>()
        .ok()
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
        .ok_or_else(|| format!("invalid number of seconds: {}", arg))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kill_indices() {
        let cli = Cli::try_parse_from([
            "bosh-test", "kill-indices",
            "--turbulence-url", "http://turbulence",
            "some-deployment", "some-job", "0", "2",
        ]).unwrap();

        match cli.command {
            Command::KillIndices { turbulence_url, deployment, job, indices, .. } => {
                assert_eq!(turbulence_url, "http://turbulence");
                assert_eq!(deployment, "some-deployment");
                assert_eq!(job, "some-job");
                assert_eq!(indices, vec![0, 2]);
            }
            command => panic!("unexpected command {:?}", command),
        }
    }

    #[test]
    fn director_flags_build_a_config() {
        let cli = Cli::try_parse_from([
            "bosh-test", "-v", "deployments",
            "--url", "https://director:25555",
            "--username", "admin",
            "--password", "secret",
            "--poll-interval", "0.5",
            "--insecure",
        ]).unwrap();
        assert!(cli.verbose);

        let Command::Deployments { director } = cli.command else {
            panic!("expected deployments");
        };
        let config = director.config().unwrap();
        assert_eq!(config.url, "https://director:25555");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
        assert_eq!(config.task_polling_interval, Duration::from_millis(500));
        assert!(config.allow_insecure_ssl);
        assert!(!config.uaa);
    }

    #[test]
    fn rejects_negative_intervals() {
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("soon").is_err());
    }
}
