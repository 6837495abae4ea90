//! Shared fixtures for the deployment tests.

#![allow(dead_code)]

use std::path::Path;

use alloy_primitives::Bytes;
use farb_deployer::ArtifactStore;
use serde_json::json;
use tempfile::TempDir;

/// Creation bytecode used for every fixture contract.
pub const FIXTURE_BYTECODE: &str = "0x6080604052348015600f57600080fd5b50";

/// Decoded [`FIXTURE_BYTECODE`].
pub fn fixture_bytecode() -> Bytes {
    FIXTURE_BYTECODE.parse().unwrap()
}

/// Writes a Hardhat-style artifact for `name` with the given constructor input types.
pub fn write_artifact(root: &Path, name: &str, constructor_inputs: &[&str]) {
    let mut abi = Vec::new();
    if !constructor_inputs.is_empty() {
        let inputs: Vec<_> = constructor_inputs
            .iter()
            .enumerate()
            .map(|(i, ty)| json!({ "name": format!("arg{i}"), "type": ty, "internalType": ty }))
            .collect();
        abi.push(json!({
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": inputs,
        }));
    }
    let artifact = json!({
        "_format": "hh-sol-artifact-1",
        "contractName": name,
        "sourceName": format!("contracts/{name}.sol"),
        "abi": abi,
        "bytecode": FIXTURE_BYTECODE,
        "deployedBytecode": "0x6080",
        "linkReferences": {},
        "deployedLinkReferences": {},
    });

    let dir = root.join(format!("{name}.sol"));
    std::fs::create_dir_all(&dir).unwrap();
    let content = serde_json::to_string_pretty(&artifact).unwrap();
    std::fs::write(dir.join(format!("{name}.json")), content).unwrap();
}

/// Artifacts for Block, Token and Distributor in a temporary directory.
pub fn farb_artifacts() -> (TempDir, ArtifactStore) {
    let dir = tempfile::tempdir().unwrap();
    write_artifact(dir.path(), "Block", &[]);
    write_artifact(dir.path(), "Token", &["string", "string"]);
    write_artifact(dir.path(), "Distributor", &["address", "uint256", "uint256"]);
    let store = ArtifactStore::new(dir.path());
    (dir, store)
}
