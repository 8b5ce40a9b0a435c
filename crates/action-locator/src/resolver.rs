//! Element resolver with retrying strategy cascade

use action_primitives::{ExecCtx, PagePort};
use async_trait::async_trait;
use locus_core_types::{ElementDescriptor, LocusError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{errors::LocatorError, store::DescriptorStore, strategies::*, types::*};

/// Pull-based source of fresh perception snapshots
#[async_trait]
pub trait PerceptionSource: Send + Sync {
    /// Observe the page and return every interactive element
    async fn observe(&self) -> Result<Vec<ElementDescriptor>, LocusError>;
}

#[async_trait]
impl<F> PerceptionSource for F
where
    F: Fn() -> Vec<ElementDescriptor> + Send + Sync,
{
    async fn observe(&self) -> Result<Vec<ElementDescriptor>, LocusError> {
        Ok(self())
    }
}

/// Outcome of probing one candidate
enum Probe {
    Missing,
    Ambiguous(usize),
    Hidden,
    Unique,
    Failed,
}

/// Resolves element ids to a unique, visible locator.
///
/// Every pass walks the full candidate list in order. Between passes the
/// resolver sleeps on the context clock and refreshes perception, always
/// within the command deadline.
pub struct Resolver {
    store: Arc<DescriptorStore>,
    perception: Arc<dyn PerceptionSource>,
    page: Arc<dyn PagePort>,
    generator: StrategyGenerator,
    backoff: Vec<Duration>,
}

impl Resolver {
    pub fn new(
        store: Arc<DescriptorStore>,
        perception: Arc<dyn PerceptionSource>,
        page: Arc<dyn PagePort>,
        generator: StrategyGenerator,
        backoff: Vec<Duration>,
    ) -> Self {
        Self {
            store,
            perception,
            page,
            generator,
            backoff,
        }
    }

    pub fn store(&self) -> &Arc<DescriptorStore> {
        &self.store
    }

    /// Replace the store with a fresh perception snapshot
    pub async fn refresh(&self) -> Result<u64, LocatorError> {
        let snapshot = self.perception.observe().await.map_err(|err| {
            warn!(error = %err, "Perception refresh failed");
            LocatorError::Perception(err.to_string())
        })?;
        Ok(self.store.replace(snapshot))
    }

    /// Resolve `element_id` before `ctx.deadline`.
    ///
    /// Ambiguity observed on any pass wins the terminal classification.
    pub async fn resolve(
        &self,
        element_id: &str,
        ctx: &ExecCtx,
    ) -> Result<ResolvedLocator, LocatorError> {
        let mut attempted: Vec<String> = Vec::new();
        let mut last_ambiguous: Option<String> = None;
        let mut passes: u32 = 0;

        while !ctx.is_timeout() {
            let descriptor = match self.store.get(element_id) {
                Some(descriptor) => descriptor,
                None => {
                    debug!(element_id, "Element not in store, refreshing perception");
                    self.refresh().await?;
                    match self.store.get(element_id) {
                        Some(descriptor) => descriptor,
                        None => {
                            return Err(terminal(last_ambiguous, attempted, Some(element_id)));
                        }
                    }
                }
            };

            passes += 1;
            let candidates = self.generator.generate(&descriptor);
            debug!(
                element_id,
                pass = passes,
                candidates = candidates.len(),
                generation = self.store.generation(),
                "Resolution pass"
            );

            for candidate in candidates {
                let selector = candidate.selector();
                if !attempted.contains(&selector) {
                    attempted.push(selector.clone());
                }
                if ctx.is_timeout() {
                    break;
                }

                match self.probe(&candidate, ctx).await {
                    Probe::Unique => {
                        info!(
                            element_id,
                            strategy = candidate.kind.name(),
                            selector = %selector,
                            passes,
                            "Resolved element"
                        );
                        return Ok(ResolvedLocator {
                            strategy: candidate.kind,
                            spec: candidate.spec,
                            passes,
                            attempted,
                        });
                    }
                    Probe::Ambiguous(count) => {
                        debug!(selector = %selector, count, "Ambiguous candidate");
                        last_ambiguous = Some(selector);
                    }
                    Probe::Missing | Probe::Hidden | Probe::Failed => {}
                }
            }

            let Some(delay) = self.backoff.get(passes as usize - 1).copied() else {
                break;
            };
            if ctx.clock.now() + delay > ctx.deadline {
                debug!(
                    element_id,
                    delay_ms = delay.as_millis() as u64,
                    "Next backoff exceeds deadline"
                );
                break;
            }
            ctx.clock.sleep(delay).await;
            self.refresh().await?;
        }

        Err(terminal(last_ambiguous, attempted, None))
    }

    async fn probe(&self, candidate: &LocatorCandidate, ctx: &ExecCtx) -> Probe {
        let budget = ctx.remaining_time();
        let count = match tokio::time::timeout(budget, self.page.count(&candidate.spec)).await {
            Ok(Ok(count)) => count,
            Ok(Err(err)) => {
                warn!(
                    strategy = candidate.kind.name(),
                    error = %err,
                    "Probe failed, skipping candidate"
                );
                return Probe::Failed;
            }
            Err(_) => return Probe::Failed,
        };

        match count {
            0 => Probe::Missing,
            1 => {
                let budget = ctx.remaining_time();
                match tokio::time::timeout(budget, self.page.is_visible(&candidate.spec)).await {
                    Ok(Ok(true)) => Probe::Unique,
                    Ok(Ok(false)) => Probe::Hidden,
                    Ok(Err(err)) => {
                        warn!(
                            strategy = candidate.kind.name(),
                            error = %err,
                            "Visibility probe failed, skipping candidate"
                        );
                        Probe::Failed
                    }
                    Err(_) => Probe::Failed,
                }
            }
            n => Probe::Ambiguous(n),
        }
    }
}

/// Terminal error once resolution gives up; any ambiguity seen wins.
fn terminal(
    last_ambiguous: Option<String>,
    attempted: Vec<String>,
    missing_id: Option<&str>,
) -> LocatorError {
    match (last_ambiguous, missing_id) {
        (Some(selector), _) => LocatorError::Ambiguous {
            selector,
            attempted,
        },
        (None, Some(element_id)) => LocatorError::NotFound {
            element_id: element_id.to_string(),
            attempted,
        },
        (None, None) => LocatorError::Unresolved { attempted },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_primitives::testing::FakePage;
    use action_primitives::{Clock, LocatorSpec, ManualClock};
    use locus_core_types::StrategyKind;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BUDGET: Duration = Duration::from_secs(20);

    fn backoff() -> Vec<Duration> {
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
        ]
    }

    struct Harness {
        page: Arc<FakePage>,
        clock: Arc<ManualClock>,
        refreshes: Arc<AtomicUsize>,
        resolver: Resolver,
    }

    fn harness(snapshots: Vec<Vec<ElementDescriptor>>) -> Harness {
        let page = Arc::new(FakePage::new("https://shop.test/"));
        let clock = Arc::new(ManualClock::new());
        let refreshes = Arc::new(AtomicUsize::new(0));
        let queue = Arc::new(Mutex::new(snapshots));
        let counter = refreshes.clone();
        let perception = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut queue = queue.lock();
            if queue.len() > 1 {
                queue.remove(0)
            } else {
                queue.first().cloned().unwrap_or_default()
            }
        };
        let resolver = Resolver::new(
            Arc::new(DescriptorStore::new()),
            Arc::new(perception),
            page.clone(),
            StrategyGenerator::default(),
            backoff(),
        );
        Harness {
            page,
            clock,
            refreshes,
            resolver,
        }
    }

    fn ctx(clock: &Arc<ManualClock>) -> ExecCtx {
        ExecCtx::new(clock.clone() as Arc<dyn Clock>, BUDGET)
    }

    fn css(selector: &str) -> LocatorSpec {
        LocatorSpec::Css(selector.to_string())
    }

    #[tokio::test]
    async fn resolves_on_first_probe() {
        let h = harness(vec![]);
        h.resolver
            .store()
            .replace(vec![ElementDescriptor::new("1", "button").with_selector_hint("#buy")]);
        h.page.set_element(&css("#buy"), 1, true);

        let resolved = h.resolver.resolve("1", &ctx(&h.clock)).await.unwrap();
        assert_eq!(resolved.strategy, StrategyKind::Css);
        assert!(resolved.first_pass());
        assert!(h.clock.sleeps().is_empty());
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn short_circuits_on_first_unique_visible() {
        let h = harness(vec![]);
        h.resolver.store().replace(vec![ElementDescriptor::new("1", "button")
            .with_attribute("data-testid", "buy")
            .with_selector_hint("#buy")]);
        let test_id = LocatorSpec::attribute("data-testid", "buy");
        h.page.set_element(&test_id, 1, true);
        h.page.set_element(&css("#buy"), 1, true);

        let resolved = h.resolver.resolve("1", &ctx(&h.clock)).await.unwrap();
        assert_eq!(resolved.strategy, StrategyKind::TestId);
        assert_eq!(resolved.attempted, vec![test_id.to_string()]);
        assert_eq!(h.page.probe_count(), 1);
    }

    #[tokio::test]
    async fn skips_hidden_and_failing_candidates() {
        let h = harness(vec![]);
        h.resolver.store().replace(vec![ElementDescriptor::new("1", "a")
            .with_role("link")
            .with_selector_hint("#broken")
            .with_selector_hint("#nav a")]);
        h.page.set_element(
            &LocatorSpec::Role {
                role: "link".into(),
                name: None,
            },
            1,
            false,
        );
        h.page.fail_probe(&css("#broken"));
        h.page.set_element(&css("#nav a"), 1, true);

        let resolved = h.resolver.resolve("1", &ctx(&h.clock)).await.unwrap();
        assert_eq!(resolved.spec, css("#nav a"));
        assert_eq!(resolved.attempted.len(), 3);
    }

    #[tokio::test]
    async fn missing_id_refreshes_once_then_fails() {
        let h = harness(vec![vec![ElementDescriptor::new("2", "button")]]);
        let err = h.resolver.resolve("1", &ctx(&h.clock)).await.unwrap_err();
        assert!(matches!(err, LocatorError::NotFound { .. }));
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 1);
        assert!(h.clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn missing_id_found_after_refresh() {
        let h = harness(vec![vec![
            ElementDescriptor::new("1", "button").with_selector_hint("#late")
        ]]);
        h.page.set_element(&css("#late"), 1, true);
        let resolved = h.resolver.resolve("1", &ctx(&h.clock)).await.unwrap();
        assert_eq!(resolved.strategy, StrategyKind::Css);
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ambiguity_exhausts_backoff() {
        let descriptor = ElementDescriptor::new("1", "button")
            .with_text("Add")
            .with_selector_hint(".add");
        let h = harness(vec![vec![descriptor.clone()]]);
        h.resolver.store().replace(vec![descriptor]);
        h.page.set_element(
            &LocatorSpec::Text {
                text: "Add".into(),
                exact: true,
            },
            3,
            true,
        );
        h.page.set_element(
            &LocatorSpec::TagWithText {
                tag: "button".into(),
                text: "Add".into(),
            },
            3,
            true,
        );
        h.page.set_element(&css(".add"), 2, true);

        let err = h.resolver.resolve("1", &ctx(&h.clock)).await.unwrap_err();
        assert!(matches!(err, LocatorError::Ambiguous { .. }));
        assert_eq!(h.clock.sleeps(), backoff());
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 3);
        assert_eq!(err.attempted().len(), 3);
    }

    #[tokio::test]
    async fn ambiguity_survives_disappearing_element() {
        let descriptor = ElementDescriptor::new("1", "button").with_selector_hint(".add");
        let h = harness(vec![vec![], vec![]]);
        h.resolver.store().replace(vec![descriptor]);
        h.page.set_element(&css(".add"), 2, true);

        let err = h.resolver.resolve("1", &ctx(&h.clock)).await.unwrap_err();
        assert!(matches!(err, LocatorError::Ambiguous { ref selector, .. } if selector == ".add"));
    }

    #[tokio::test]
    async fn unresolved_after_all_retries() {
        let descriptor = ElementDescriptor::new("1", "button").with_selector_hint("#gone");
        let h = harness(vec![vec![descriptor.clone()]]);
        h.resolver.store().replace(vec![descriptor]);

        let err = h.resolver.resolve("1", &ctx(&h.clock)).await.unwrap_err();
        assert!(matches!(err, LocatorError::Unresolved { .. }));
        assert_eq!(h.clock.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn backoff_stops_before_deadline() {
        let descriptor = ElementDescriptor::new("1", "button").with_selector_hint("#gone");
        let h = harness(vec![vec![descriptor.clone()]]);
        h.resolver.store().replace(vec![descriptor]);
        let ctx = ctx(&h.clock);
        h.clock.advance(Duration::from_secs(18));

        let err = h.resolver.resolve("1", &ctx).await.unwrap_err();
        assert!(matches!(err, LocatorError::Unresolved { .. }));
        assert_eq!(h.clock.sleeps(), vec![Duration::from_secs(1)]);
        assert!(ctx.clock.now() <= ctx.deadline);
    }

    #[tokio::test]
    async fn element_becomes_visible_after_refresh() {
        let page = Arc::new(FakePage::new("https://shop.test/"));
        let clock = Arc::new(ManualClock::new());
        page.set_element(&css("#slow"), 1, false);

        let observed = page.clone();
        let perception = move || {
            observed.set_element(&LocatorSpec::Css("#slow".into()), 1, true);
            vec![ElementDescriptor::new("1", "button").with_selector_hint("#slow")]
        };
        let store = Arc::new(DescriptorStore::new());
        store.replace(vec![
            ElementDescriptor::new("1", "button").with_selector_hint("#slow")
        ]);
        let resolver = Resolver::new(
            store,
            Arc::new(perception),
            page.clone(),
            StrategyGenerator::default(),
            backoff(),
        );

        let resolved = resolver.resolve("1", &ctx(&clock)).await.unwrap();
        assert_eq!(resolved.passes, 2);
        assert!(!resolved.first_pass());
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
        assert_eq!(resolver.store().generation(), 2);
    }

    #[tokio::test]
    async fn resolution_is_deterministic() {
        let descriptor = ElementDescriptor::new("1", "button")
            .with_role("button")
            .with_name("Pay")
            .with_selector_hint("#pay");
        let h = harness(vec![]);
        h.resolver.store().replace(vec![descriptor]);
        h.page.set_element(
            &LocatorSpec::Role {
                role: "button".into(),
                name: Some("Pay".into()),
            },
            1,
            true,
        );
        h.page.set_element(&css("#pay"), 1, true);

        for _ in 0..3 {
            let resolved = h.resolver.resolve("1", &ctx(&h.clock)).await.unwrap();
            assert_eq!(resolved.strategy, StrategyKind::AriaRole);
        }
    }

    #[tokio::test]
    async fn perception_failure_is_reported() {
        struct Broken;

        #[async_trait]
        impl PerceptionSource for Broken {
            async fn observe(&self) -> Result<Vec<ElementDescriptor>, LocusError> {
                Err(LocusError::new("observer crashed"))
            }
        }

        let page = Arc::new(FakePage::new("about:blank"));
        let clock = Arc::new(ManualClock::new());
        let resolver = Resolver::new(
            Arc::new(DescriptorStore::new()),
            Arc::new(Broken),
            page,
            StrategyGenerator::default(),
            backoff(),
        );
        let err = resolver.resolve("1", &ctx(&clock)).await.unwrap_err();
        assert!(matches!(err, LocatorError::Perception(_)));
    }

    #[tokio::test]
    async fn expired_context_never_probes() {
        let h = harness(vec![]);
        h.resolver
            .store()
            .replace(vec![ElementDescriptor::new("1", "button").with_selector_hint("#x")]);
        let ctx = ctx(&h.clock);
        h.clock.advance(BUDGET);
        let err = h.resolver.resolve("1", &ctx).await.unwrap_err();
        assert!(matches!(err, LocatorError::Unresolved { .. }));
        assert_eq!(h.page.probe_count(), 0);
    }
}
