//! The submit-and-confirm seam between the orchestrator and the network.

use std::future::Future;

use alloy_primitives::{Address, Bytes, TxHash};

use crate::StepError;

/// Outcome of a confirmed contract creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// Address of the created contract
    pub address: Address,
    /// Block the creation was included in
    pub block_number: Option<u64>,
}

/// Submits contract-creation transactions and waits for their confirmation.
///
/// Implementations own the signing key and the network connection. The orchestrator calls
/// [`submit`](Self::submit) and then [`confirm`](Self::confirm) for one target at a time and never
/// overlaps two targets.
pub trait ContractDeployer {
    /// Address the contracts are deployed from.
    fn deployer_address(&self) -> Address;

    /// Sends a creation transaction carrying `init_code` and returns its hash once the network
    /// has accepted it.
    fn submit(
        &self,
        contract: &str,
        init_code: Bytes,
    ) -> impl Future<Output = Result<TxHash, StepError>> + Send;

    /// Waits until the creation transaction `tx_hash` is included and returns the created
    /// contract's address.
    fn confirm(
        &self,
        contract: &str,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Confirmation, StepError>> + Send;
}
