//! Compiled contract artifacts.
//!
//! Both Hardhat (`bytecode` as a hex string) and Foundry (`bytecode.object`, compiler version in
//! `metadata`) artifacts are accepted, laid out as `<root>/<Name>.sol/<Name>.json`.

use std::path::{Path, PathBuf};

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{hex, Bytes};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::{config::parse_compiler_version, ArtifactError, ConfigError};

/// Artifact file format, covering the Hardhat and Foundry shapes.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    contract_name: Option<String>,
    #[serde(default)]
    abi: JsonAbi,
    bytecode: RawBytecode,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object { object: String },
}

impl RawBytecode {
    fn as_str(&self) -> &str {
        match self {
            Self::Hex(s) | Self::Object { object: s } => s,
        }
    }
}

/// A compiled contract ready to be deployed.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Contract name
    pub contract_name: String,
    /// Contract ABI
    pub abi: JsonAbi,
    /// Creation bytecode, without constructor arguments
    pub bytecode: Bytes,
    /// Compiler version recorded in the artifact, if any
    pub compiler: Option<semver::Version>,
}

impl Artifact {
    /// Parses an artifact from its JSON representation.
    pub fn from_json_str(contract: &str, json: &str) -> Result<Self, ArtifactError> {
        let raw: RawArtifact = serde_json::from_str(json)
            .map_err(|source| ArtifactError::Parse { path: PathBuf::from(contract), source })?;
        Self::from_raw(contract, raw)
    }

    fn from_raw(contract: &str, raw: RawArtifact) -> Result<Self, ArtifactError> {
        let code = raw.bytecode.as_str().trim();
        if code.trim_start_matches("0x").is_empty() {
            return Err(ArtifactError::EmptyBytecode(contract.to_string()));
        }
        let bytecode = hex::decode(code).map_err(|e| ArtifactError::InvalidBytecode {
            contract: contract.to_string(),
            reason: e.to_string(),
        })?;

        let compiler = raw
            .metadata
            .as_ref()
            .and_then(|m| m.pointer("/compiler/version"))
            .and_then(|v| v.as_str())
            .and_then(|v| parse_compiler_version(v).ok());

        Ok(Self {
            contract_name: raw.contract_name.unwrap_or_else(|| contract.to_string()),
            abi: raw.abi,
            bytecode: bytecode.into(),
            compiler,
        })
    }

    /// ABI-encodes constructor arguments, type-checked against the ABI constructor.
    ///
    /// A contract without a constructor accepts only an empty argument list.
    pub fn encode_constructor_args(&self, args: &[DynSolValue]) -> Result<Bytes, ArtifactError> {
        match &self.abi.constructor {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map(Bytes::from)
                .map_err(|e| ArtifactError::AbiMismatch {
                    contract: self.contract_name.clone(),
                    reason: e.to_string(),
                }),
            None if args.is_empty() => Ok(Bytes::new()),
            None => Err(ArtifactError::AbiMismatch {
                contract: self.contract_name.clone(),
                reason: format!("no constructor, but {} argument(s) given", args.len()),
            }),
        }
    }

    /// Creation bytecode followed by the encoded constructor arguments.
    pub fn init_code(&self, encoded_args: &[u8]) -> Bytes {
        let mut code = Vec::with_capacity(self.bytecode.len() + encoded_args.len());
        code.extend_from_slice(&self.bytecode);
        code.extend_from_slice(encoded_args);
        code.into()
    }
}

/// Loads artifacts from a build output directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    compiler: Option<semver::Version>,
}

impl ArtifactStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), compiler: None }
    }

    /// Requires artifacts that record a compiler version to match `compiler`.
    pub fn with_compiler(mut self, compiler: Option<semver::Version>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the artifact for `contract`.
    pub fn path_for(&self, contract: &str) -> PathBuf {
        self.root.join(format!("{contract}.sol")).join(format!("{contract}.json"))
    }

    /// Loads and validates the artifact for `contract`.
    pub fn load(&self, contract: &str) -> Result<Artifact, ArtifactError> {
        let path = self.path_for(contract);
        trace!(contract, path = %path.display(), "Loading artifact");
        if !path.is_file() {
            return Err(ArtifactError::NotFound { contract: contract.to_string(), path });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|source| ArtifactError::FileRead { path: path.clone(), source })?;
        let raw: RawArtifact = serde_json::from_str(&content)
            .map_err(|source| ArtifactError::Parse { path: path.clone(), source })?;
        let artifact = Artifact::from_raw(contract, raw)?;

        if let (Some(expected), Some(found)) = (&self.compiler, &artifact.compiler) {
            if (expected.major, expected.minor, expected.patch) !=
                (found.major, found.minor, found.patch)
            {
                return Err(ConfigError::CompilerMismatch {
                    contract: contract.to_string(),
                    expected: expected.clone(),
                    found: found.clone(),
                }
                .into());
            }
        }

        debug!(contract, bytecode_len = artifact.bytecode.len(), "Artifact loaded");
        Ok(artifact)
    }
}
