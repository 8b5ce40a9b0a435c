//! Engine facade

use action_flow::{CommandExecutor, DefaultCommandExecutor};
use action_locator::{DescriptorStore, PerceptionSource, Resolver, StrategyGenerator};
use action_primitives::{Clock, PagePort, TokioClock};
use locus_core_types::{Command, ElementDescriptor, InteractionResult};
use locus_policy_center::PolicyView;
use locus_privacy::SecretStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::EngineError;

/// Resolution and execution engine bound to one page.
///
/// Commands are serialised: a second `execute_command` waits until the
/// first has produced its result.
pub struct InteractionEngine {
    store: Arc<DescriptorStore>,
    secrets: Arc<SecretStore>,
    executor: DefaultCommandExecutor,
    policy: PolicyView,
    in_flight: Mutex<()>,
}

impl InteractionEngine {
    /// Engine with default policy and the tokio clock
    pub fn new(page: Arc<dyn PagePort>, perception: Arc<dyn PerceptionSource>) -> Self {
        Self::builder(page, perception).build()
    }

    pub fn builder(
        page: Arc<dyn PagePort>,
        perception: Arc<dyn PerceptionSource>,
    ) -> EngineBuilder {
        EngineBuilder {
            page,
            perception,
            policy: None,
            clock: None,
            secrets: None,
        }
    }

    /// Register the real value behind a placeholder token
    pub fn register_secret(
        &self,
        placeholder: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.secrets.register(placeholder, value)?;
        Ok(())
    }

    /// Replace the descriptor map with a fresh perception snapshot
    pub fn update_map(&self, elements: Vec<ElementDescriptor>) -> u64 {
        self.store.replace(elements)
    }

    /// Run one command to completion
    pub async fn execute_command(&self, command: Command) -> InteractionResult {
        let _guard = self.in_flight.lock().await;
        debug!(generation = self.store.generation(), "Command accepted");
        self.executor.execute(&command).await
    }

    pub fn policy(&self) -> &PolicyView {
        &self.policy
    }

    pub fn store(&self) -> &DescriptorStore {
        &self.store
    }
}

impl std::fmt::Debug for InteractionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionEngine")
            .field("store", &self.store)
            .field("secrets", &self.secrets)
            .field("policy_rev", &self.policy.rev)
            .finish()
    }
}

/// Builder for [`InteractionEngine`]
pub struct EngineBuilder {
    page: Arc<dyn PagePort>,
    perception: Arc<dyn PerceptionSource>,
    policy: Option<PolicyView>,
    clock: Option<Arc<dyn Clock>>,
    secrets: Option<Arc<SecretStore>>,
}

impl EngineBuilder {
    pub fn policy(mut self, policy: PolicyView) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share a secret store owned by the caller
    pub fn secrets(mut self, secrets: Arc<SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn build(self) -> InteractionEngine {
        let policy = self.policy.unwrap_or_default();
        let clock = self.clock.unwrap_or_else(|| Arc::new(TokioClock));
        let secrets = self.secrets.unwrap_or_default();
        let store = Arc::new(DescriptorStore::new());

        let resolver = Arc::new(Resolver::new(
            store.clone(),
            self.perception,
            self.page.clone(),
            StrategyGenerator::new(&policy.locator),
            policy.backoff(),
        ));
        let executor = DefaultCommandExecutor::new(
            self.page,
            resolver,
            secrets.clone(),
            clock,
            policy.clone(),
        );

        InteractionEngine {
            store,
            secrets,
            executor,
            policy,
            in_flight: Mutex::new(()),
        }
    }
}
