//! Sequential, dependency-ordered deployment of a [`DeploymentPlan`].

use std::io::Write;

use tracing::{debug, info, warn};

use crate::{
    ArtifactStore, ContractDeployer, DeployError, DeployedInstance, DeploymentPlan,
    DeploymentStatus, DeploymentTarget, Result, RunRecord, StepError,
};

/// Deploys the targets of a plan one at a time, feeding confirmed addresses into later
/// constructors.
///
/// The first failing step aborts the run. Contracts confirmed before the failure stay deployed.
#[derive(Debug)]
pub struct Orchestrator<D> {
    deployer: D,
    artifacts: ArtifactStore,
    plan: DeploymentPlan,
}

impl<D: ContractDeployer> Orchestrator<D> {
    /// Creates an orchestrator for the Block → Token → Distributor plan.
    pub fn new(deployer: D, artifacts: ArtifactStore) -> Self {
        Self { deployer, artifacts, plan: DeploymentPlan::farb() }
    }

    /// Replaces the deployment plan.
    pub fn with_plan(mut self, plan: DeploymentPlan) -> Self {
        self.plan = plan;
        self
    }

    /// The deployer in use.
    pub fn deployer(&self) -> &D {
        &self.deployer
    }

    /// The deployment plan.
    pub fn plan(&self) -> &DeploymentPlan {
        &self.plan
    }

    /// Runs the plan, printing one `<Name> deployed at <Address>` line per target to stdout.
    pub async fn run(&self) -> Result<RunRecord> {
        self.run_with_output(&mut std::io::stdout()).await
    }

    /// Runs the plan, writing status lines to `out`.
    ///
    /// A target is added to the run record as soon as it is confirmed, before its status line is
    /// written, so a failing run still reports every contract it left deployed.
    pub async fn run_with_output<W: Write>(&self, out: &mut W) -> Result<RunRecord> {
        info!(
            targets = self.plan.len(),
            deployer = %self.deployer.deployer_address(),
            "Starting deployment"
        );

        let mut record = RunRecord::default();
        for target in self.plan.targets() {
            let instance = match self.deploy(target, &record).await {
                Ok(instance) => instance,
                Err(source) => {
                    warn!(
                        contract = %target.name,
                        error = %source,
                        confirmed = record.len(),
                        "Deployment failed, aborting run"
                    );
                    return Err(DeployError::Step { target: target.name.clone(), source, record });
                }
            };

            let line = instance.to_string();
            record.push(instance);
            if let Err(source) = writeln!(out, "{line}").and_then(|()| out.flush()) {
                warn!(contract = %target.name, error = %source, "Failed to write status line");
                return Err(DeployError::Output { source, record });
            }
        }

        info!(deployed = record.len(), "Deployment complete");
        Ok(record)
    }

    async fn deploy(
        &self,
        target: &DeploymentTarget,
        record: &RunRecord,
    ) -> Result<DeployedInstance, StepError> {
        let mut progress = Progress::new(&target.name);
        let result = self.step(target, record, &mut progress).await;
        if result.is_err() {
            progress.advance(DeploymentStatus::Failed);
        }
        result
    }

    async fn step(
        &self,
        target: &DeploymentTarget,
        record: &RunRecord,
        progress: &mut Progress<'_>,
    ) -> Result<DeployedInstance, StepError> {
        let name = target.name.as_str();

        let args = target.resolve_args(record)?;
        let artifact = self.artifacts.load(name)?;
        let constructor_args = artifact.encode_constructor_args(&args)?;
        let init_code = artifact.init_code(&constructor_args);

        let tx_hash = self.deployer.submit(name, init_code).await?;
        progress.advance(DeploymentStatus::Submitted);
        debug!(contract = name, %tx_hash, "Awaiting confirmation");

        let confirmation = self.deployer.confirm(name, tx_hash).await?;
        progress.advance(DeploymentStatus::Confirmed);
        info!(
            contract = name,
            address = %confirmation.address,
            block = ?confirmation.block_number,
            "Confirmed"
        );

        Ok(DeployedInstance {
            name: target.name.clone(),
            address: confirmation.address,
            tx_hash,
            block_number: confirmation.block_number,
            constructor_args,
            status: progress.status,
        })
    }
}

/// Status of the target currently being deployed.
#[derive(Debug)]
struct Progress<'a> {
    contract: &'a str,
    status: DeploymentStatus,
}

impl<'a> Progress<'a> {
    fn new(contract: &'a str) -> Self {
        debug!(contract, status = %DeploymentStatus::NotStarted, "Preparing");
        Self { contract, status: DeploymentStatus::NotStarted }
    }

    /// Moves to `next`. Terminal statuses are never left.
    fn advance(&mut self, next: DeploymentStatus) {
        debug_assert!(
            !self.status.is_terminal(),
            "{} moved from {} to {next}",
            self.contract,
            self.status
        );
        debug!(contract = self.contract, from = %self.status, to = %next, "Status changed");
        self.status = next;
    }
}
