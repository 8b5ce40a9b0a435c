//! In-memory page for exercising the engine without a browser

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::errors::ActionError;
use crate::page::PagePort;
use crate::types::LocatorSpec;

#[derive(Clone, Debug, Default)]
struct FakeElement {
    count: usize,
    visible: bool,
    value: String,
}

#[derive(Debug, Default)]
struct FakeState {
    url: String,
    elements: HashMap<String, FakeElement>,
    probe_errors: HashSet<String>,
    click_navigates: HashMap<String, String>,
    click_error: Option<ActionError>,
    fill_error: Option<ActionError>,
    fill_rewrite: Option<String>,
    navigate_error: Option<(ActionError, Option<String>)>,
    settle_error: Option<ActionError>,
    settle_calls: usize,
    probes: usize,
    read_backs: usize,
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    navigations: Vec<String>,
}

/// Scriptable [`PagePort`] keyed by the rendered locator string.
///
/// Elements are looked up by `LocatorSpec::to_string()`, so a test declares
/// exactly which strategies match and how many elements each one sees.
#[derive(Debug, Default)]
pub struct FakePage {
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                url: url.into(),
                ..FakeState::default()
            }),
        }
    }

    /// Make `spec` match `count` elements, the first one `visible` or not
    pub fn set_element(&self, spec: &LocatorSpec, count: usize, visible: bool) {
        let mut state = self.state.lock();
        let entry = state.elements.entry(spec.to_string()).or_default();
        entry.count = count;
        entry.visible = visible;
    }

    /// Probing `spec` raises an error
    pub fn fail_probe(&self, spec: &LocatorSpec) {
        self.state.lock().probe_errors.insert(spec.to_string());
    }

    /// Clicking `spec` moves the page to `url`
    pub fn navigate_on_click(&self, spec: &LocatorSpec, url: impl Into<String>) {
        self.state
            .lock()
            .click_navigates
            .insert(spec.to_string(), url.into());
    }

    pub fn fail_click(&self, err: ActionError) {
        self.state.lock().click_error = Some(err);
    }

    pub fn fail_fill(&self, err: ActionError) {
        self.state.lock().fill_error = Some(err);
    }

    /// Filled fields report `value` instead of what was typed
    pub fn rewrite_fill(&self, value: impl Into<String>) {
        self.state.lock().fill_rewrite = Some(value.into());
    }

    /// Navigation fails; the page optionally ends up at `landed`
    pub fn fail_navigate(&self, err: ActionError, landed: Option<&str>) {
        self.state.lock().navigate_error = Some((err, landed.map(str::to_string)));
    }

    pub fn fail_settle(&self, err: ActionError) {
        self.state.lock().settle_error = Some(err);
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().clicks.clone()
    }

    /// Every `(locator, text)` pair delivered to `fill`
    pub fn fills(&self) -> Vec<(String, String)> {
        self.state.lock().fills.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    pub fn settle_calls(&self) -> usize {
        self.state.lock().settle_calls
    }

    /// Number of `count` probes served
    pub fn probe_count(&self) -> usize {
        self.state.lock().probes
    }

    /// Number of `input_value` reads served
    pub fn read_backs(&self) -> usize {
        self.state.lock().read_backs
    }
}

#[async_trait]
impl PagePort for FakePage {
    async fn count(&self, spec: &LocatorSpec) -> Result<usize, ActionError> {
        let key = spec.to_string();
        let mut state = self.state.lock();
        state.probes += 1;
        if state.probe_errors.contains(&key) {
            return Err(ActionError::InvalidLocator(key));
        }
        Ok(state.elements.get(&key).map(|el| el.count).unwrap_or(0))
    }

    async fn is_visible(&self, spec: &LocatorSpec) -> Result<bool, ActionError> {
        let state = self.state.lock();
        Ok(state
            .elements
            .get(&spec.to_string())
            .map(|el| el.count > 0 && el.visible)
            .unwrap_or(false))
    }

    async fn click(&self, spec: &LocatorSpec, _timeout: Duration) -> Result<(), ActionError> {
        let key = spec.to_string();
        let mut state = self.state.lock();
        state.clicks.push(key.clone());
        if let Some(err) = state.click_error.clone() {
            return Err(err);
        }
        if let Some(url) = state.click_navigates.get(&key).cloned() {
            state.url = url;
        }
        Ok(())
    }

    async fn fill(
        &self,
        spec: &LocatorSpec,
        text: &str,
        _timeout: Duration,
    ) -> Result<(), ActionError> {
        let key = spec.to_string();
        let mut state = self.state.lock();
        state.fills.push((key.clone(), text.to_string()));
        if let Some(err) = state.fill_error.clone() {
            return Err(err);
        }
        let value = state
            .fill_rewrite
            .clone()
            .unwrap_or_else(|| text.to_string());
        state.elements.entry(key).or_default().value = value;
        Ok(())
    }

    async fn input_value(&self, spec: &LocatorSpec) -> Result<String, ActionError> {
        let mut state = self.state.lock();
        state.read_backs += 1;
        Ok(state
            .elements
            .get(&spec.to_string())
            .map(|el| el.value.clone())
            .unwrap_or_default())
    }

    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        state.navigations.push(url.to_string());
        if let Some((err, landed)) = state.navigate_error.clone() {
            if let Some(landed) = landed {
                state.url = landed;
            }
            return Err(err);
        }
        state.url = url.to_string();
        Ok(())
    }

    async fn wait_for_settle(&self, _timeout: Duration) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        state.settle_calls += 1;
        match state.settle_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn current_url(&self) -> String {
        self.state.lock().url.clone()
    }
}
