//! Command executor implementation

use crate::errors::{FlowError, StepFailure};
use action_locator::Resolver;
use action_primitives::{Clock, ExecCtx, LocatorSpec, PagePort, SettleWait};
use async_trait::async_trait;
use locus_core_types::{ActionKind, Command, InteractionResult};
use locus_policy_center::PolicyView;
use locus_privacy::{redact_url, SecretStore};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Command executor trait
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute one command. Never fails; every problem is classified in
    /// the returned result.
    async fn execute(&self, command: &Command) -> InteractionResult;
}

type StepResult = Result<InteractionResult, StepFailure>;

/// Default command executor implementation
pub struct DefaultCommandExecutor {
    page: Arc<dyn PagePort>,
    resolver: Arc<Resolver>,
    secrets: Arc<SecretStore>,
    clock: Arc<dyn Clock>,
    policy: PolicyView,
    settle: SettleWait,
}

impl DefaultCommandExecutor {
    /// Create a new command executor
    pub fn new(
        page: Arc<dyn PagePort>,
        resolver: Arc<Resolver>,
        secrets: Arc<SecretStore>,
        clock: Arc<dyn Clock>,
        policy: PolicyView,
    ) -> Self {
        let settle = SettleWait::new(policy.settle_timeout());
        Self {
            page,
            resolver,
            secrets,
            clock,
            policy,
            settle,
        }
    }

    pub fn policy(&self) -> &PolicyView {
        &self.policy
    }

    #[instrument(
        skip_all,
        fields(command_id = %ctx.command_id, action = %command.kind())
    )]
    async fn run(&self, command: &Command, ctx: &ExecCtx) -> InteractionResult {
        info!(element_id = ?command.element_id(), "Executing command");

        let action = command.kind();
        let outcome = match command {
            Command::Click { .. } => self.click(command.element_id(), ctx).await,
            Command::Type { text_content, .. } => {
                self.type_text(command.element_id(), text_content.as_deref(), ctx)
                    .await
            }
            Command::Navigate { url } => {
                let url = url.as_deref().filter(|url| !url.is_empty());
                self.navigate(url, ctx).await
            }
        };

        let latency_ms = ctx.elapsed().as_millis() as u64;
        let result = match outcome {
            Ok(result) => {
                info!(
                    element_id = ?result.element_id,
                    strategy = ?result.locator_kind.map(|k| k.name()),
                    progress = ?result.progress_signal,
                    latency_ms,
                    "Command succeeded"
                );
                result
            }
            Err(failure) => {
                let result = self.failure_result(ctx, action, failure);
                warn!(
                    element_id = ?result.element_id,
                    failure_kind = ?result.failure_kind.map(|k| k.name()),
                    reason = ?result.failure_reason,
                    latency_ms,
                    "Command failed"
                );
                result
            }
        };
        result.with_elapsed(latency_ms)
    }

    /// Build the failure result; every reason and selector is redacted.
    ///
    /// Locator failures carry rendered selectors, so only registered secret
    /// values are scrubbed from them. Page errors are free-form and also get
    /// credential masking.
    fn failure_result(
        &self,
        ctx: &ExecCtx,
        action: ActionKind,
        failure: StepFailure,
    ) -> InteractionResult {
        let message = failure.error.to_string();
        let reason = match &failure.error {
            FlowError::Locator(_) => self.secrets.scrub_values(&message),
            _ => self.secrets.redact(&message),
        };
        let attempted = failure
            .error
            .attempted()
            .iter()
            .map(|selector| self.secrets.scrub_values(selector))
            .collect();
        InteractionResult::failure(
            ctx.command_id.clone(),
            action,
            failure.error.failure_kind(),
            reason,
        )
        .with_element(failure.element_id.as_deref())
        .with_locator(failure.locator)
        .with_url(failure.url_after)
        .with_attempted(attempted)
    }

    async fn resolve(
        &self,
        element_id: &str,
        ctx: &ExecCtx,
    ) -> Result<action_locator::ResolvedLocator, StepFailure> {
        match self.resolver.resolve(element_id, ctx).await {
            Ok(resolved) => Ok(resolved),
            Err(err) => {
                let url = self.page.current_url().await;
                Err(StepFailure::new(err).element(element_id).url(url))
            }
        }
    }

    async fn click(&self, element_id: Option<&str>, ctx: &ExecCtx) -> StepResult {
        let element_id = element_id.ok_or(FlowError::MissingField("Missing element_id"))?;
        let initial_url = self.page.current_url().await;
        let resolved = self.resolve(element_id, ctx).await?;

        let budget = ctx.remaining_time();
        let outcome = match timeout(budget, self.page.click(&resolved.spec, budget)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) if err.is_timeout() => Err(FlowError::Timeout("Click")),
            Err(_) => Err(FlowError::Timeout("Click")),
            Ok(Err(err)) => Err(FlowError::Action(err)),
        };
        if let Err(err) = outcome {
            let url = self.page.current_url().await;
            return Err(StepFailure::new(err)
                .element(element_id)
                .locator(resolved.strategy)
                .url(url));
        }

        self.settle.run(self.page.as_ref(), ctx.remaining_time()).await;
        let url_after = self.page.current_url().await;
        let signal = if url_after != initial_url {
            "url_change"
        } else {
            "click_success"
        };

        Ok(
            InteractionResult::success(ctx.command_id.clone(), ActionKind::Click, signal)
                .with_element(Some(element_id))
                .with_locator(Some(resolved.strategy))
                .with_url(Some(url_after)),
        )
    }

    async fn type_text(
        &self,
        element_id: Option<&str>,
        text: Option<&str>,
        ctx: &ExecCtx,
    ) -> StepResult {
        let (Some(element_id), Some(text)) = (element_id, text) else {
            return Err(FlowError::MissingField("Missing id or text").into());
        };
        let resolved = self.resolve(element_id, ctx).await?;

        let substitution = self.secrets.substitute(text);
        debug!(
            chars = substitution.len(),
            secret = substitution.substituted(),
            "Delivering text"
        );

        let budget = ctx.remaining_time();
        let filled = timeout(
            budget,
            self.page.fill(&resolved.spec, substitution.expose(), budget),
        )
        .await;
        let outcome = match filled {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) if err.is_timeout() => Err(FlowError::Timeout("Type")),
            Err(_) => Err(FlowError::Timeout("Type")),
            Ok(Err(err)) => Err(FlowError::Action(err)),
        };
        if let Err(err) = outcome {
            let url = self.page.current_url().await;
            return Err(StepFailure::new(err)
                .element(element_id)
                .locator(resolved.strategy)
                .url(url));
        }

        if self.policy.execution.verify_fill && !substitution.substituted() {
            self.verify_fill(&resolved.spec, substitution.expose()).await;
        }

        let url_after = self.page.current_url().await;
        Ok(
            InteractionResult::success(ctx.command_id.clone(), ActionKind::Type, "input_filled")
                .with_element(Some(element_id))
                .with_locator(Some(resolved.strategy))
                .with_url(Some(url_after)),
        )
    }

    /// Read the field back; a mismatch is only logged.
    async fn verify_fill(&self, spec: &LocatorSpec, expected: &str) {
        match self.page.input_value(spec).await {
            Ok(actual) if actual == expected => debug!("Fill verified"),
            Ok(actual) => warn!(
                expected_chars = expected.chars().count(),
                actual_chars = actual.chars().count(),
                "Filled value differs from requested text"
            ),
            Err(err) => warn!(error = %err, "Fill verification failed"),
        }
    }

    async fn navigate(&self, url: Option<&str>, ctx: &ExecCtx) -> StepResult {
        let url = url.ok_or(FlowError::MissingField("Missing URL"))?;
        info!(url = %redact_url(url, &[]), "Navigating");

        let budget = ctx.remaining_time();
        let outcome = match timeout(budget, self.page.navigate(url, budget)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(FlowError::Action(err)),
            Err(_) => Err(FlowError::Action(action_primitives::ActionError::Timeout(
                format!("navigation exceeded {}ms", budget.as_millis()),
            ))),
        };

        let url_after = self.page.current_url().await;
        match outcome {
            Ok(()) => Ok(InteractionResult::success(
                ctx.command_id.clone(),
                ActionKind::Navigate,
                "navigation",
            )
            .with_url(Some(url_after))),
            Err(err) => Err(StepFailure::new(err).url(url_after)),
        }
    }
}

#[async_trait]
impl CommandExecutor for DefaultCommandExecutor {
    async fn execute(&self, command: &Command) -> InteractionResult {
        let ctx = ExecCtx::new(self.clock.clone(), self.policy.command_budget());
        self.run(command, &ctx).await
    }
}
