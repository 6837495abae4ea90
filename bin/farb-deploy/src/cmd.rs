use std::{path::PathBuf, time::Duration};

use clap::Parser;
use farb_deployer::{
    config::DEFAULT_ARTIFACTS_DIR, ArtifactStore, ConfigError, DeployConfig, HarnessConfig,
    Orchestrator, RpcDeployer, RunRecord, SigningKey,
};
use tracing::{debug, info, warn};

use crate::common::{CliError, LogArgs, Result};

/// Deploy the Block, Token and Distributor contracts, in that order
#[derive(Parser, Debug)]
#[command(name = "farb-deploy", version, about)]
pub struct DeployCmd {
    /// Network/compiler configuration file
    #[arg(long = "config", default_value = "deploy.config.json")]
    pub config: PathBuf,

    /// Network to deploy to; may be omitted when exactly one is configured
    #[arg(long = "network")]
    pub network: Option<String>,

    /// RPC url, overrides the network's url from the configuration file
    #[arg(long = "rpc-url", visible_aliases = ["rpc"], env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Deployer private key. Defaults to the environment variable named by the network's
    /// `accountsEnv` (OPEN_SOURCE_PKEY when unset)
    #[arg(long = "private-key")]
    pub private_key: Option<String>,

    /// Directory holding compiled artifacts (`<Name>.sol/<Name>.json`)
    #[arg(long = "artifacts", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Block confirmations to wait for per contract
    #[arg(long = "confirmations", default_value_t = 1)]
    pub confirmations: u64,

    /// Give up waiting for a receipt after this many seconds
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Write the run record as JSON to this file
    #[arg(long = "record-out", value_name = "FILE")]
    pub record_out: Option<PathBuf>,

    /// Env file to load before reading the signing key
    #[arg(long = "env-file", default_value = ".env")]
    pub env_file: PathBuf,

    /// Logging configuration
    #[command(flatten)]
    pub log: LogArgs,
}

impl DeployCmd {
    /// Execute the deployment
    pub async fn run(&self) -> Result<()> {
        self.load_env_file()?;
        let config = self.deploy_config()?;

        let deployer = RpcDeployer::connect(&config).await?;
        let artifacts =
            ArtifactStore::new(&config.artifacts_dir).with_compiler(config.compiler.clone());
        let result = Orchestrator::new(deployer, artifacts).run().await;
        self.finish(result)
    }

    /// Writes the run record, or the partial record of a failed run, to `--record-out`.
    ///
    /// A deployment error takes precedence over a failure to write the partial record.
    fn finish(&self, result: farb_deployer::Result<RunRecord>) -> Result<()> {
        match result {
            Ok(record) => self.write_record(&record),
            Err(err) => {
                if let Some(record) = err.partial_record() {
                    if let Err(write_err) = self.write_record(record) {
                        warn!(error = %write_err, "Failed to write partial run record");
                    }
                }
                Err(err.into())
            }
        }
    }

    fn write_record(&self, record: &RunRecord) -> Result<()> {
        let Some(ref path) = self.record_out else { return Ok(()) };
        record.write_json(path).map_err(CliError::RecordWrite)?;
        info!(path = %path.display(), entries = record.len(), "Run record written");
        Ok(())
    }

    /// Loads the env file. A missing file is not an error.
    fn load_env_file(&self) -> Result<()> {
        match dotenvy::from_path(&self.env_file) {
            Ok(()) => {
                debug!(path = %self.env_file.display(), "Loaded env file");
                Ok(())
            }
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolves the configuration file, flags and environment into a [`DeployConfig`].
    pub fn deploy_config(&self) -> Result<DeployConfig> {
        let harness = HarnessConfig::load(&self.config)?;
        let (name, entry) = harness.select(self.network.as_deref())?;
        let network = entry.resolve(name, self.rpc_url.as_deref())?;

        let key_env = entry.key_env();
        let raw_key = match &self.private_key {
            Some(key) => key.clone(),
            None => std::env::var(key_env)
                .map_err(|_| ConfigError::MissingSigningKey(key_env.to_string()))?,
        };
        let signing_key: SigningKey = raw_key.parse().map_err(|e| match e {
            ConfigError::MissingSigningKey(_) => {
                ConfigError::MissingSigningKey(key_env.to_string())
            }
            other => other,
        })?;

        debug!(
            network = name,
            url = %network.url,
            deployer = %signing_key.address(),
            "Resolved configuration"
        );

        Ok(DeployConfig::new(network, signing_key)
            .with_artifacts_dir(&self.artifacts)
            .with_compiler(harness.compiler_version()?)
            .with_confirmations(self.confirmations)
            .with_receipt_timeout(self.timeout.map(Duration::from_secs)))
    }
}
