//! Deployment targets and the fixed deployment plan.

use std::{collections::HashSet, fmt};

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::U256;

use crate::{PlanError, RunRecord, StepError};

/// Name of the block contract.
pub const BLOCK: &str = "Block";
/// Name of the token contract.
pub const TOKEN: &str = "Token";
/// Name of the distributor contract.
pub const DISTRIBUTOR: &str = "Distributor";

/// Display name passed to the token constructor.
pub const TOKEN_NAME: &str = "Fake Arb";
/// Symbol passed to the token constructor.
pub const TOKEN_SYMBOL: &str = "FARB";

/// Lower bound of the distribution window.
pub const DISTRIBUTION_START: u64 = 16_872_354;
/// Upper bound of the distribution window.
pub const DISTRIBUTION_END: u64 = 26_872_354;

/// A constructor argument, either fixed or taken from an earlier deployment.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructorArg {
    /// A literal ABI value
    Literal(DynSolValue),
    /// The confirmed address of the named target
    AddressOf(String),
}

impl ConstructorArg {
    /// A `string` literal.
    pub fn string(s: impl Into<String>) -> Self {
        Self::Literal(DynSolValue::String(s.into()))
    }

    /// A `uint256` literal.
    pub fn uint(n: u64) -> Self {
        Self::Literal(DynSolValue::Uint(U256::from(n), 256))
    }

    /// The confirmed address of `target`.
    pub fn address_of(target: impl Into<String>) -> Self {
        Self::AddressOf(target.into())
    }
}

/// Lifecycle of a single deployment target within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentStatus {
    /// Not yet submitted
    NotStarted,
    /// Creation transaction submitted, awaiting confirmation
    Submitted,
    /// Creation confirmed on-network
    Confirmed,
    /// Submission or confirmation failed
    Failed,
}

impl DeploymentStatus {
    /// Whether the status can no longer change.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not started",
            Self::Submitted => "submitted",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A contract to deploy, identified by its artifact name.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentTarget {
    /// Contract (and artifact) name
    pub name: String,
    /// Constructor arguments, in ABI order
    pub args: Vec<ConstructorArg>,
}

impl DeploymentTarget {
    /// Creates a target with no constructor arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), args: Vec::new() }
    }

    /// Appends a constructor argument.
    pub fn arg(mut self, arg: ConstructorArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Names of the targets this one depends on.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.args.iter().filter_map(|arg| match arg {
            ConstructorArg::AddressOf(name) => Some(name.as_str()),
            ConstructorArg::Literal(_) => None,
        })
    }

    /// Substitutes confirmed addresses from `record` into the argument list.
    pub fn resolve_args(&self, record: &RunRecord) -> Result<Vec<DynSolValue>, StepError> {
        self.args
            .iter()
            .map(|arg| match arg {
                ConstructorArg::Literal(value) => Ok(value.clone()),
                ConstructorArg::AddressOf(name) => record
                    .address_of(name)
                    .map(DynSolValue::Address)
                    .ok_or_else(|| StepError::Arguments(name.clone())),
            })
            .collect()
    }
}

/// An ordered list of targets where every dependency is deployed before its dependents.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentPlan {
    targets: Vec<DeploymentTarget>,
}

impl DeploymentPlan {
    /// Validates and creates a plan.
    pub fn new(targets: Vec<DeploymentTarget>) -> Result<Self, PlanError> {
        let mut seen = HashSet::new();
        for target in &targets {
            if let Some(dependency) = target.dependencies().find(|dep| !seen.contains(dep)) {
                return Err(PlanError::UnresolvedDependency {
                    target: target.name.clone(),
                    dependency: dependency.to_string(),
                });
            }
            if !seen.insert(target.name.as_str()) {
                return Err(PlanError::DuplicateTarget(target.name.clone()));
            }
        }
        Ok(Self { targets })
    }

    /// The Block → Token → Distributor plan.
    pub fn farb() -> Self {
        Self {
            targets: vec![
                DeploymentTarget::new(BLOCK),
                DeploymentTarget::new(TOKEN)
                    .arg(ConstructorArg::string(TOKEN_NAME))
                    .arg(ConstructorArg::string(TOKEN_SYMBOL)),
                DeploymentTarget::new(DISTRIBUTOR)
                    .arg(ConstructorArg::address_of(TOKEN))
                    .arg(ConstructorArg::uint(DISTRIBUTION_START))
                    .arg(ConstructorArg::uint(DISTRIBUTION_END)),
            ],
        }
    }

    /// Targets in deployment order.
    pub fn targets(&self) -> &[DeploymentTarget] {
        &self.targets
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Default for DeploymentPlan {
    fn default() -> Self {
        Self::farb()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, B256, Bytes};

    use super::*;
    use crate::DeployedInstance;

    #[test]
    fn test_farb_plan_is_valid() {
        let plan = DeploymentPlan::farb();
        assert_eq!(DeploymentPlan::new(plan.targets().to_vec()).unwrap(), plan);

        let names: Vec<_> = plan.targets().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, [BLOCK, TOKEN, DISTRIBUTOR]);

        let deps: Vec<_> = plan.targets()[2].dependencies().collect();
        assert_eq!(deps, [TOKEN]);
    }

    #[test]
    fn test_plan_rejects_forward_reference() {
        let err = DeploymentPlan::new(vec![
            DeploymentTarget::new(DISTRIBUTOR).arg(ConstructorArg::address_of(TOKEN)),
            DeploymentTarget::new(TOKEN),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            PlanError::UnresolvedDependency {
                target: DISTRIBUTOR.to_string(),
                dependency: TOKEN.to_string()
            }
        );
    }

    #[test]
    fn test_plan_rejects_self_reference_and_duplicates() {
        let self_ref = DeploymentPlan::new(vec![
            DeploymentTarget::new(TOKEN).arg(ConstructorArg::address_of(TOKEN)),
        ]);
        assert!(matches!(self_ref, Err(PlanError::UnresolvedDependency { .. })));

        let dup =
            DeploymentPlan::new(vec![DeploymentTarget::new(BLOCK), DeploymentTarget::new(BLOCK)]);
        assert_eq!(dup.unwrap_err(), PlanError::DuplicateTarget(BLOCK.to_string()));
    }

    #[test]
    fn test_resolve_args_uses_confirmed_address() {
        let plan = DeploymentPlan::farb();
        let distributor = &plan.targets()[2];
        let mut record = RunRecord::default();
        assert!(matches!(
            distributor.resolve_args(&record),
            Err(StepError::Arguments(name)) if name == TOKEN
        ));

        let token = Address::repeat_byte(0xab);
        record.push(DeployedInstance {
            name: TOKEN.to_string(),
            address: token,
            tx_hash: B256::ZERO,
            block_number: Some(1),
            constructor_args: Bytes::new(),
            status: DeploymentStatus::Confirmed,
        });

        let args = distributor.resolve_args(&record).unwrap();
        assert_eq!(
            args,
            vec![
                DynSolValue::Address(token),
                DynSolValue::Uint(U256::from(DISTRIBUTION_START), 256),
                DynSolValue::Uint(U256::from(DISTRIBUTION_END), 256),
            ]
        );
    }

    #[test]
    fn test_status_terminal() {
        assert!(!DeploymentStatus::NotStarted.is_terminal());
        assert!(!DeploymentStatus::Submitted.is_terminal());
        assert!(DeploymentStatus::Confirmed.is_terminal());
        assert!(DeploymentStatus::Failed.is_terminal());
    }
}
