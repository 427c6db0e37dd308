//! In-memory page used by unit tests

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use pmcheck_common::{Locator, Waits};

use crate::error::{E2eError, E2eResult};
use crate::page::{PageDriver, PageElement};

pub fn fast_waits() -> Waits {
    Waits {
        element: Duration::from_millis(60),
        presence: Duration::from_millis(30),
        page_load: Duration::from_secs(1),
        poll_interval: Duration::from_millis(5),
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    locator: Option<Locator>,
    text: String,
    displayed: bool,
    enabled: bool,
    parent: Option<usize>,
    /// Lookups that miss this node before it shows up
    hidden_lookups: u32,
    /// URL the page switches to when this node is clicked
    navigates_to: Option<String>,
    /// Nodes that appear when this node is clicked
    reveals: Vec<usize>,
    removed: bool,
}

#[derive(Debug, Default)]
struct State {
    nodes: Vec<Node>,
    url: String,
    title: String,
    events: Vec<String>,
    clicked: Vec<String>,
    fail_lookups: bool,
    fail_screenshot: bool,
}

#[derive(Clone, Default)]
pub struct FakeDriver {
    state: Arc<Mutex<State>>,
}

/// Builder handle for one node
pub struct NodeRef {
    state: Arc<Mutex<State>>,
    id: usize,
}

#[derive(Clone)]
pub struct FakeElement {
    state: Arc<Mutex<State>>,
    id: usize,
}

fn lock(state: &Arc<Mutex<State>>) -> MutexGuard<'_, State> {
    state.lock().unwrap()
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(url: &str) -> Self {
        let driver = Self::new();
        lock(&driver.state).url = url.to_string();
        driver
    }

    pub fn add(&self, locator: Locator, text: &str) -> NodeRef {
        self.push(Some(locator), text, None)
    }

    fn push(&self, locator: Option<Locator>, text: &str, parent: Option<usize>) -> NodeRef {
        let mut state = lock(&self.state);
        state.nodes.push(Node {
            locator,
            text: text.to_string(),
            displayed: true,
            enabled: true,
            parent,
            ..Default::default()
        });
        NodeRef {
            state: self.state.clone(),
            id: state.nodes.len() - 1,
        }
    }

    pub fn set_title(&self, title: &str) {
        lock(&self.state).title = title.to_string();
    }

    pub fn fail_lookups(&self) {
        lock(&self.state).fail_lookups = true;
    }

    pub fn fail_screenshots(&self) {
        lock(&self.state).fail_screenshot = true;
    }

    pub fn url(&self) -> String {
        lock(&self.state).url.clone()
    }

    /// `goto:`, `click:`, `clear:` and `type:` entries in call order
    pub fn events(&self) -> Vec<String> {
        lock(&self.state).events.clone()
    }

    pub fn clicked_texts(&self) -> Vec<String> {
        lock(&self.state).clicked.clone()
    }

    /// Text typed into the first node matching `locator`
    pub fn typed_into(&self, locator: &Locator) -> Option<String> {
        let state = lock(&self.state);
        state
            .nodes
            .iter()
            .find(|n| n.locator.as_ref() == Some(locator))
            .map(|n| n.text.clone())
    }
}

impl NodeRef {
    pub fn appear_after(self, lookups: u32) -> Self {
        lock(&self.state).nodes[self.id].hidden_lookups = lookups;
        self
    }

    pub fn displayed(self, displayed: bool) -> Self {
        lock(&self.state).nodes[self.id].displayed = displayed;
        self
    }

    pub fn enabled(self, enabled: bool) -> Self {
        lock(&self.state).nodes[self.id].enabled = enabled;
        self
    }

    pub fn navigates_to(self, url: &str) -> Self {
        lock(&self.state).nodes[self.id].navigates_to = Some(url.to_string());
        self
    }

    /// Keep `other` out of the page until this node is clicked
    pub fn reveals(self, other: &NodeRef) -> Self {
        let mut state = lock(&self.state);
        state.nodes[other.id].removed = true;
        state.nodes[self.id].reveals.push(other.id);
        drop(state);
        self
    }

    pub fn child(&self, locator: Locator, text: &str) -> NodeRef {
        let driver = FakeDriver {
            state: self.state.clone(),
        };
        driver.push(Some(locator), text, Some(self.id))
    }
}

fn lookup(
    state: &Arc<Mutex<State>>,
    locator: &Locator,
    parent: Option<usize>,
) -> E2eResult<Vec<FakeElement>> {
    let mut guard = lock(state);
    if guard.fail_lookups {
        return Err(E2eError::Report("session is gone".into()));
    }
    let mut found = Vec::new();
    for (id, node) in guard.nodes.iter_mut().enumerate() {
        if node.removed || node.locator.as_ref() != Some(locator) {
            continue;
        }
        if parent.is_some() && node.parent != parent {
            continue;
        }
        if node.hidden_lookups > 0 {
            node.hidden_lookups -= 1;
            continue;
        }
        found.push(FakeElement {
            state: state.clone(),
            id,
        });
    }
    Ok(found)
}

#[async_trait]
impl PageDriver for FakeDriver {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = lock(&self.state);
        state.url = url.to_string();
        state.events.push(format!("goto:{}", url));
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<FakeElement>> {
        lookup(&self.state, locator, None)
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.url())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok(lock(&self.state).title.clone())
    }

    async fn screenshot_png(&self) -> E2eResult<Vec<u8>> {
        if lock(&self.state).fail_screenshot {
            return Err(E2eError::Report("screenshot unavailable".into()));
        }
        Ok(b"\x89PNG fake".to_vec())
    }
}

impl FakeElement {
    fn label(&self, state: &State) -> String {
        state.nodes[self.id]
            .locator
            .as_ref()
            .map(|l| l.to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageElement for FakeElement {
    async fn click(&self) -> E2eResult<()> {
        let mut state = lock(&self.state);
        let label = self.label(&state);
        state.events.push(format!("click:{}", label));
        let node = state.nodes[self.id].clone();
        state.clicked.push(node.text.clone());
        if let Some(url) = node.navigates_to {
            state.url = url;
        }
        for id in node.reveals {
            state.nodes[id].removed = false;
        }
        Ok(())
    }

    async fn clear(&self) -> E2eResult<()> {
        let mut state = lock(&self.state);
        let label = self.label(&state);
        state.events.push(format!("clear:{}", label));
        state.nodes[self.id].text.clear();
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> E2eResult<()> {
        let mut state = lock(&self.state);
        let label = self.label(&state);
        state.events.push(format!("type:{}:{}", label, text));
        state.nodes[self.id].text.push_str(text);
        Ok(())
    }

    async fn text(&self) -> E2eResult<String> {
        Ok(lock(&self.state).nodes[self.id].text.clone())
    }

    async fn is_displayed(&self) -> E2eResult<bool> {
        Ok(lock(&self.state).nodes[self.id].displayed)
    }

    async fn is_enabled(&self) -> E2eResult<bool> {
        Ok(lock(&self.state).nodes[self.id].enabled)
    }

    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<FakeElement>> {
        lookup(&self.state, locator, Some(self.id))
    }
}
