//! Run record of confirmed deployments.

use std::{fmt, io::Write, path::Path};

use alloy_primitives::{Address, Bytes, TxHash};
use serde::{Deserialize, Serialize};

use crate::DeploymentStatus;

/// A confirmed deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedInstance {
    /// Contract name
    pub name: String,
    /// Address of the created contract
    pub address: Address,
    /// Creation transaction hash
    pub tx_hash: TxHash,
    /// Block the creation was included in, when the network reports it
    pub block_number: Option<u64>,
    /// ABI-encoded constructor arguments appended to the creation bytecode
    pub constructor_args: Bytes,
    /// Deployment status
    #[serde(skip, default = "confirmed")]
    pub status: DeploymentStatus,
}

const fn confirmed() -> DeploymentStatus {
    DeploymentStatus::Confirmed
}

impl fmt::Display for DeployedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} deployed at {}", self.name, self.address)
    }
}

/// Ordered (name, address) pairs produced by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    entries: Vec<DeployedInstance>,
}

impl RunRecord {
    /// Appends a confirmed deployment.
    pub fn push(&mut self, instance: DeployedInstance) {
        self.entries.push(instance);
    }

    /// Entries in deployment order.
    pub fn entries(&self) -> &[DeployedInstance] {
        &self.entries
    }

    /// The deployment of `name`, if confirmed in this run.
    pub fn get(&self, name: &str) -> Option<&DeployedInstance> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Confirmed address of `name`.
    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.get(name).map(|entry| entry.address)
    }

    /// (name, address) pairs in deployment order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, Address)> {
        self.entries.iter().map(|entry| (entry.name.as_str(), entry.address))
    }

    /// Number of confirmed deployments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was deployed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the record as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        writeln!(file)
    }
}

impl<'a> IntoIterator for &'a RunRecord {
    type Item = &'a DeployedInstance;
    type IntoIter = std::slice::Iter<'a, DeployedInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
