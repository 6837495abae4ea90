//! Ordered deployment of the Block, Token and Distributor contracts.
//!
//! A run deploys each target of a [`DeploymentPlan`] in turn through a [`ContractDeployer`],
//! waiting for every creation to be confirmed before resolving the constructor arguments of the
//! next one.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod artifact;
pub use artifact::*;

pub mod config;
pub use config::{DeployConfig, HarnessConfig, NetworkConfig, NetworkEntry, SigningKey};

mod deployer;
pub use deployer::*;

mod error;
pub use error::*;

mod orchestrator;
pub use orchestrator::*;

mod record;
pub use record::*;

mod rpc;
pub use rpc::*;

mod target;
pub use target::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
