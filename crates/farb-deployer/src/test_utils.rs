//! In-memory [`ContractDeployer`] for tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard},
};

use alloy_primitives::{address, keccak256, Address, Bytes, TxHash};

use crate::{Confirmation, ContractDeployer, StepError};

/// Default sender address (Hardhat account #0).
pub const DEFAULT_DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// A creation transaction seen by [`MockDeployer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Contract name
    pub contract: String,
    /// Creation bytecode with encoded constructor arguments
    pub init_code: Bytes,
    /// Hash assigned to the transaction, `None` if it was rejected
    pub tx_hash: Option<TxHash>,
}

#[derive(Debug, Default)]
struct MockState {
    nonce: u64,
    block_number: u64,
    submissions: Vec<Submission>,
    pending: HashMap<TxHash, Address>,
    reject_submission: HashSet<String>,
    reject_confirmation: HashSet<String>,
    revert: HashSet<String>,
}

/// Deployer that assigns CREATE addresses from a sender and nonce without touching a network.
///
/// Nonces keep increasing across runs, so re-running against the same mock yields new
/// addresses.
#[derive(Debug)]
pub struct MockDeployer {
    deployer: Address,
    state: Mutex<MockState>,
}

impl Default for MockDeployer {
    fn default() -> Self {
        Self::new(DEFAULT_DEPLOYER)
    }
}

impl MockDeployer {
    /// Creates a mock deploying from `deployer`, starting at nonce zero.
    pub fn new(deployer: Address) -> Self {
        Self { deployer, state: Mutex::new(MockState::default()) }
    }

    /// Rejects the creation transaction of `contract` at submission.
    pub fn reject_submission(self, contract: &str) -> Self {
        self.state().reject_submission.insert(contract.to_string());
        self
    }

    /// Accepts the creation transaction of `contract` but fails while waiting for it.
    pub fn reject_confirmation(self, contract: &str) -> Self {
        self.state().reject_confirmation.insert(contract.to_string());
        self
    }

    /// Includes the creation transaction of `contract` with a failed status.
    pub fn revert(self, contract: &str) -> Self {
        self.state().revert.insert(contract.to_string());
        self
    }

    /// Every submit call so far, in order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.state().submissions.clone()
    }

    /// Submit calls made for `contract`.
    pub fn submissions_for(&self, contract: &str) -> Vec<Submission> {
        self.state().submissions.iter().filter(|s| s.contract == contract).cloned().collect()
    }

    /// Next nonce to be used.
    pub fn nonce(&self) -> u64 {
        self.state().nonce
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }
}

impl ContractDeployer for MockDeployer {
    fn deployer_address(&self) -> Address {
        self.deployer
    }

    async fn submit(&self, contract: &str, init_code: Bytes) -> Result<TxHash, StepError> {
        let mut state = self.state();
        if state.reject_submission.contains(contract) {
            state.submissions.push(Submission {
                contract: contract.to_string(),
                init_code,
                tx_hash: None,
            });
            return Err(StepError::Submission("insufficient funds for gas * price + value".into()));
        }

        let nonce = state.nonce;
        state.nonce += 1;

        let mut preimage = self.deployer.to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let tx_hash = keccak256(preimage);

        state.pending.insert(tx_hash, self.deployer.create(nonce));
        state.submissions.push(Submission {
            contract: contract.to_string(),
            init_code,
            tx_hash: Some(tx_hash),
        });
        Ok(tx_hash)
    }

    async fn confirm(&self, contract: &str, tx_hash: TxHash) -> Result<Confirmation, StepError> {
        let mut state = self.state();
        let address = state.pending.remove(&tx_hash).ok_or_else(|| StepError::Confirmation {
            tx_hash,
            reason: "unknown transaction".to_string(),
        })?;

        if state.reject_confirmation.contains(contract) {
            return Err(StepError::Confirmation {
                tx_hash,
                reason: "transaction dropped from mempool".to_string(),
            });
        }
        state.block_number += 1;
        if state.revert.contains(contract) {
            return Err(StepError::Reverted(tx_hash));
        }

        Ok(Confirmation { address, block_number: Some(state.block_number) })
    }
}
