use crate::core::dispatch::{DispatchConfig, DispatchPool, DispatchSummary};
use crate::core::domains::{self, CandidateDomains};
use crate::core::exclusion::{self, ForbiddenMap};
use crate::core::matcher;
use crate::domain::model::{ExclusionGroup, Matching, Registry};
use crate::domain::ports::{Confirmation, Notifier};
use crate::utils::error::{ExchangeError, Result};
use std::sync::Arc;

/// Everything the engine needs, already validated by a loader.
#[derive(Debug, Clone)]
pub struct ExchangeSetup {
    pub registry: Registry,
    pub groups: Vec<ExclusionGroup>,
    pub seed: i64,
    pub dispatch: DispatchConfig,
}

/// Output of the matching phase.
#[derive(Debug, Clone)]
pub struct ExchangePlan {
    pub forbidden: ForbiddenMap,
    pub domains: CandidateDomains,
    pub matching: Matching,
}

pub struct ExchangeEngine<N: Notifier + ?Sized + 'static, C: Confirmation> {
    setup: ExchangeSetup,
    notifier: Arc<N>,
    confirmation: C,
}

impl<N: Notifier + ?Sized + 'static, C: Confirmation> ExchangeEngine<N, C> {
    pub fn new(setup: ExchangeSetup, notifier: Arc<N>, confirmation: C) -> Self {
        Self {
            setup,
            notifier,
            confirmation,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.setup.registry
    }

    /// Resolves exclusions, builds domains and searches for a matching.
    pub fn plan(&self) -> Result<ExchangePlan> {
        let registry = &self.setup.registry;
        tracing::info!("Found {} people", registry.len());

        let forbidden = exclusion::resolve(&self.setup.groups);
        let domains = domains::build(registry, &forbidden, self.setup.seed);

        if let Some(id) = domains.first_empty() {
            tracing::warn!("{} has no eligible partner", registry.get(id));
        }

        let matching = matcher::solve(registry, &domains).ok_or(ExchangeError::Infeasible {
            participants: registry.len(),
        })?;
        matching.verify(registry, &forbidden)?;

        Ok(ExchangePlan {
            forbidden,
            domains,
            matching,
        })
    }

    pub async fn run(&self) -> Result<DispatchSummary> {
        let plan = self.plan()?;

        if !self.confirmation.confirm(&self.setup.registry, &plan.matching)? {
            return Err(ExchangeError::Aborted);
        }

        let assignments = plan.matching.assignments(&self.setup.registry);
        tracing::info!("Dispatching {} assignments", assignments.len());

        let summary =
            DispatchPool::dispatch_all(&self.setup.dispatch, Arc::clone(&self.notifier), assignments)
                .await?;

        if summary.is_complete() {
            tracing::info!("✅ Done! {} messages delivered", summary.delivered);
        } else {
            tracing::warn!(
                "Finished with {} undelivered assignments",
                summary.dead_letters.len()
            );
        }
        Ok(summary)
    }
}
