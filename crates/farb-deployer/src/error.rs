//! Error types for the deployment harness.

use std::path::PathBuf;

use alloy_primitives::TxHash;

use crate::RunRecord;

/// Errors raised while loading or validating the harness configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config {path}: {source}")]
    FileRead {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse the configuration file
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// No network with the requested name is configured
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    /// Several networks are configured and none was selected
    #[error("No network selected, available: {0}")]
    AmbiguousNetwork(String),

    /// The network has no RPC endpoint
    #[error("Network '{0}' has no RPC url")]
    MissingUrl(String),

    /// The RPC endpoint is not a valid URL
    #[error("Invalid RPC url '{url}': {reason}")]
    InvalidUrl {
        /// The rejected value
        url: String,
        /// Parser message
        reason: String,
    },

    /// No signing key was supplied
    #[error("Missing signing key (expected in {0})")]
    MissingSigningKey(String),

    /// The signing key could not be parsed
    #[error("Invalid signing key: {0}")]
    InvalidSigningKey(String),

    /// The compiler version string is not a semantic version
    #[error("Invalid compiler version '{version}': {reason}")]
    InvalidCompilerVersion {
        /// The rejected value
        version: String,
        /// Parser message
        reason: String,
    },

    /// An artifact was built by a different compiler than the one configured
    #[error("Artifact {contract} was compiled with solc {found}, expected {expected}")]
    CompilerMismatch {
        /// Contract name
        contract: String,
        /// Configured compiler version
        expected: semver::Version,
        /// Compiler version recorded in the artifact
        found: semver::Version,
    },

    /// The endpoint serves a different chain than the configured one
    #[error("Chain id mismatch: configured {expected}, endpoint reports {actual}")]
    ChainIdMismatch {
        /// Configured chain id
        expected: u64,
        /// Chain id reported by the endpoint
        actual: u64,
    },

    /// The endpoint could not be queried
    #[error("RPC endpoint unreachable: {0}")]
    Unreachable(String),
}

/// Errors raised while loading a compiled contract artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// No artifact file exists for the contract
    #[error("Artifact not found for {contract} at {path}")]
    NotFound {
        /// Contract name
        contract: String,
        /// Path that was probed
        path: PathBuf,
    },

    /// Failed to read the artifact file
    #[error("Failed to read artifact {path}: {source}")]
    FileRead {
        /// Artifact path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse the artifact file
    #[error("Failed to parse artifact {path}: {source}")]
    Parse {
        /// Artifact path
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// The artifact has no creation bytecode (interface or abstract contract)
    #[error("Artifact for {0} has no creation bytecode")]
    EmptyBytecode(String),

    /// The creation bytecode is not valid hex (for example, unlinked library placeholders)
    #[error("Invalid bytecode for {contract}: {reason}")]
    InvalidBytecode {
        /// Contract name
        contract: String,
        /// Decoder message
        reason: String,
    },

    /// The constructor arguments do not fit the ABI constructor
    #[error("Constructor arguments for {contract} do not match the ABI: {reason}")]
    AbiMismatch {
        /// Contract name
        contract: String,
        /// Encoder message
        reason: String,
    },

    /// Compiler pin violated
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while validating a deployment plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Two targets share a name
    #[error("Duplicate deployment target: {0}")]
    DuplicateTarget(String),

    /// A target references the address of a target that is not deployed before it
    #[error("Target {target} depends on {dependency}, which is not deployed earlier")]
    UnresolvedDependency {
        /// The dependent target
        target: String,
        /// The referenced target
        dependency: String,
    },
}

/// Failure of a single deployment step.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// A constructor argument could not be resolved
    #[error("Unresolved constructor argument: address of {0} is not available")]
    Arguments(String),

    /// The artifact could not be loaded or encoded
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// The network rejected the creation transaction
    #[error("Submission failed: {0}")]
    Submission(String),

    /// The transaction was accepted but never confirmed
    #[error("Confirmation failed for {tx_hash}: {reason}")]
    Confirmation {
        /// Creation transaction hash
        tx_hash: TxHash,
        /// Reason reported by the network layer
        reason: String,
    },

    /// The creation transaction was included but reverted
    #[error("Creation transaction {0} reverted")]
    Reverted(TxHash),

    /// The receipt did not carry a contract address
    #[error("Receipt of {0} has no contract address")]
    NoContractAddress(TxHash),
}

/// Top-level error of a deployment run.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid deployment plan
    #[error("Invalid deployment plan: {0}")]
    Plan(#[from] PlanError),

    /// A deployment step failed; later targets were not attempted
    #[error("Deployment of {target} failed: {source}")]
    Step {
        /// Name of the failing target
        target: String,
        /// Cause of the failure
        #[source]
        source: StepError,
        /// Contracts confirmed before the failure
        record: RunRecord,
    },

    /// A status line could not be written; later targets were not attempted
    #[error("Failed to write output: {source}")]
    Output {
        /// Underlying IO error
        #[source]
        source: std::io::Error,
        /// Contracts confirmed so far, including the one whose line failed
        record: RunRecord,
    },
}

impl DeployError {
    /// Name of the target whose step failed, if the failure happened mid-run.
    pub fn failed_target(&self) -> Option<&str> {
        match self {
            Self::Step { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Contracts that stay deployed although the run failed.
    ///
    /// `None` when the run failed before anything was attempted.
    pub fn partial_record(&self) -> Option<&RunRecord> {
        match self {
            Self::Step { record, .. } | Self::Output { record, .. } => Some(record),
            Self::Config(_) | Self::Plan(_) => None,
        }
    }
}

/// Result type of the deployment harness.
pub type Result<T, E = DeployError> = std::result::Result<T, E>;
