//! JSON-RPC backed [`ContractDeployer`].

use std::time::Duration;

use alloy_network::{Ethereum, EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use tracing::{debug, info};

use crate::{Confirmation, ConfigError, ContractDeployer, DeployConfig, StepError};

/// Deploys contracts through an HTTP JSON-RPC endpoint, signing locally.
#[derive(Debug, Clone)]
pub struct RpcDeployer<P = DynProvider<Ethereum>> {
    provider: P,
    deployer: Address,
    confirmations: u64,
    receipt_timeout: Option<Duration>,
}

impl RpcDeployer {
    /// Connects to the configured network with a wallet built from the signing key.
    ///
    /// When the network pins a chain id, the endpoint is queried and must report the same id.
    pub async fn connect(config: &DeployConfig) -> Result<Self, ConfigError> {
        let wallet = EthereumWallet::from(config.signing_key.signer().clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(config.network.url.clone())
            .erased();

        if let Some(expected) = config.network.chain_id {
            let actual = provider
                .get_chain_id()
                .await
                .map_err(|e| ConfigError::Unreachable(e.to_string()))?;
            if actual != expected {
                return Err(ConfigError::ChainIdMismatch { expected, actual });
            }
            debug!(chain_id = actual, "Endpoint chain id verified");
        }

        info!(
            network = %config.network.name,
            deployer = %config.signing_key.address(),
            "Connected to network"
        );

        Ok(Self::new(provider, config.signing_key.address())
            .with_confirmations(config.confirmations)
            .with_receipt_timeout(config.receipt_timeout))
    }
}

impl<P> RpcDeployer<P>
where
    P: Provider<Ethereum>,
{
    /// Wraps a provider that is able to sign for `deployer`.
    pub fn new(provider: P, deployer: Address) -> Self {
        Self { provider, deployer, confirmations: 1, receipt_timeout: None }
    }

    /// Sets the number of confirmations to wait for; zero is treated as one.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Sets the receipt timeout.
    pub fn with_receipt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P> ContractDeployer for RpcDeployer<P>
where
    P: Provider<Ethereum> + Send + Sync,
{
    fn deployer_address(&self) -> Address {
        self.deployer
    }

    async fn submit(&self, contract: &str, init_code: Bytes) -> Result<TxHash, StepError> {
        let tx = TransactionRequest::default().from(self.deployer).with_deploy_code(init_code);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| StepError::Submission(e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        debug!(contract, %tx_hash, "Creation transaction sent");
        Ok(tx_hash)
    }

    async fn confirm(&self, contract: &str, tx_hash: TxHash) -> Result<Confirmation, StepError> {
        debug!(
            contract,
            %tx_hash,
            confirmations = self.confirmations,
            timeout = ?self.receipt_timeout,
            "Waiting for receipt"
        );
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_required_confirmations(self.confirmations)
            .with_timeout(self.receipt_timeout)
            .get_receipt()
            .await
            .map_err(|e| StepError::Confirmation { tx_hash, reason: e.to_string() })?;

        if !receipt.status() {
            return Err(StepError::Reverted(tx_hash));
        }
        let address = receipt.contract_address().ok_or(StepError::NoContractAddress(tx_hash))?;

        Ok(Confirmation { address, block_number: receipt.block_number() })
    }
}
