//! In-memory page for tests.
//!
//! [`MockPage`] implements [`PageDriver`] without a browser. Besides a call
//! history it keeps a model of what the injected runtime would hold (node
//! counts, cursor, highlight, story index, overlays), built by decoding the
//! same dispatch expressions a real page receives. Faults can be switched on
//! to exercise the guards: failing or hanging evaluation, hanging geometry,
//! failing real actions.

use crate::driver::PageDriver;
use crate::locator::{BoundingBox, Locator, Point};
use crate::result::{VisualError, VisualResult};
use crate::runtime::{
    parse_dispatch, CursorShape, RuntimeCall, StoryStep, CURSOR_HOME, INJECTION_MARKER,
};
use crate::style::names;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Dim/lift state of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    /// Neither dimmed nor faded
    #[default]
    None,
    /// Page dimmed, story lifted
    Story,
    /// Story faded
    Page,
}

/// What the injected runtime holds in the current document
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeModel {
    /// In-page injection marker
    pub injected: bool,
    /// Number of instrumentation nodes per element id
    pub nodes: HashMap<String, usize>,
    /// Cursor position
    pub cursor: Point,
    /// Cursor shape
    pub cursor_shape: CursorShape,
    /// Shape to apply at the next click bounce
    pub pending_shape: Option<CursorShape>,
    /// Ripples played
    pub ripples: usize,
    /// Element carrying the highlight
    pub highlighted: Option<Locator>,
    /// Feature of the current story
    pub feature: String,
    /// Scenario of the current story
    pub scenario: String,
    /// Steps of the current story
    pub steps: Vec<StoryStep>,
    /// Active step, -1 before the first advance
    pub step_index: i32,
    /// Story panel visible
    pub story_visible: bool,
    /// Dim state
    pub focus: FocusState,
    /// Result overlay, `Some(passed)` while shown
    pub result: Option<bool>,
}

impl Default for RuntimeModel {
    fn default() -> Self {
        Self {
            injected: false,
            nodes: HashMap::new(),
            cursor: CURSOR_HOME,
            cursor_shape: CursorShape::Pointer,
            pending_shape: None,
            ripples: 0,
            highlighted: None,
            feature: String::new(),
            scenario: String::new(),
            steps: Vec::new(),
            step_index: -1,
            story_visible: false,
            focus: FocusState::None,
            result: None,
        }
    }
}

impl RuntimeModel {
    fn inject(&mut self) -> Value {
        if self.injected {
            return Value::Bool(false);
        }
        for id in names::NODE_IDS.iter().copied().chain([names::STYLE_ID]) {
            self.nodes.entry(id.to_string()).or_insert(1);
        }
        self.injected = true;
        Value::Bool(true)
    }

    fn apply(&mut self, call: &RuntimeCall, elements: &HashMap<Locator, MockElement>) -> Value {
        match call {
            RuntimeCall::Move { x, y, .. } => {
                self.cursor = Point::new(*x, *y);
                Value::Bool(true)
            }
            RuntimeCall::SetCursorShape { shape } => {
                self.cursor_shape = *shape;
                self.pending_shape = None;
                serde_json::to_value(shape).unwrap_or(Value::Null)
            }
            RuntimeCall::QueueShapeChange { shape } => {
                self.pending_shape = Some(*shape);
                Value::Bool(true)
            }
            RuntimeCall::Click => {
                self.ripples += 1;
                if let Some(shape) = self.pending_shape.take() {
                    self.cursor_shape = shape;
                }
                Value::Bool(true)
            }
            RuntimeCall::Highlight { locator } => {
                self.highlighted = None;
                let found = elements.contains_key(locator);
                if found {
                    self.highlighted = Some(locator.clone());
                }
                Value::Bool(found)
            }
            RuntimeCall::UnhighlightCurrent => {
                self.highlighted = None;
                Value::Bool(true)
            }
            RuntimeCall::SetStory {
                feature,
                scenario,
                steps,
                start_hidden,
            } => {
                self.feature.clone_from(feature);
                self.scenario.clone_from(scenario);
                self.steps.clone_from(steps);
                self.step_index = -1;
                self.story_visible = !start_hidden;
                Value::Bool(true)
            }
            RuntimeCall::AdvanceStep => {
                let last = self.steps.len() as i32 - 1;
                if self.step_index < last {
                    self.step_index += 1;
                    self.story_visible = true;
                }
                Value::from(self.step_index)
            }
            RuntimeCall::HideStory => {
                self.story_visible = false;
                self.feature.clear();
                self.scenario.clear();
                self.steps.clear();
                self.step_index = -1;
                Value::Bool(true)
            }
            RuntimeCall::ShowResult { passed } => {
                self.result = Some(*passed);
                Value::Bool(true)
            }
            RuntimeCall::HideResult => {
                self.result = None;
                Value::Bool(true)
            }
            RuntimeCall::FocusStory => {
                self.focus = FocusState::Story;
                self.story_visible = true;
                Value::Bool(true)
            }
            RuntimeCall::FocusPage => {
                self.focus = FocusState::Page;
                Value::Bool(true)
            }
            RuntimeCall::FocusReset => {
                self.focus = FocusState::None;
                Value::Bool(true)
            }
        }
    }
}

#[derive(Debug, Clone)]
struct MockElement {
    bounds: BoundingBox,
    value: String,
    input_events: usize,
}

#[derive(Debug, Default)]
struct Faults {
    fail_evaluate: bool,
    hang_evaluate: bool,
    hang_bounding_box: bool,
    fail_actions: bool,
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    elements: HashMap<Locator, MockElement>,
    focused: Option<Locator>,
    history: Vec<String>,
    evaluations: usize,
    init_scripts: Vec<String>,
    runtime: RuntimeModel,
    calls: Vec<RuntimeCall>,
    screenshot: Option<Vec<u8>>,
    faults: Faults,
}

impl MockState {
    fn record(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }

    fn action(&mut self, name: &str, locator: &Locator) -> VisualResult<()> {
        self.record(format!("{name}:{locator}"));
        if self.faults.fail_actions {
            return Err(VisualError::input(format!("{name} rejected on {locator}")));
        }
        if !self.elements.contains_key(locator) {
            return Err(VisualError::ElementNotFound {
                locator: locator.to_string(),
            });
        }
        Ok(())
    }
}

/// Page double with a modelled runtime and fault injection.
///
/// Clones share state, so a test can keep a probe while the page itself is
/// moved into a [`crate::VisualPage`].
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    state: Arc<Mutex<MockState>>,
}

impl MockPage {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an element with an empty value
    #[must_use]
    pub fn with_element(self, locator: Locator, bounds: BoundingBox) -> Self {
        self.state().elements.insert(
            locator,
            MockElement {
                bounds,
                value: String::new(),
                input_events: 0,
            },
        );
        self
    }

    /// Bytes returned by `screenshot_jpeg`
    #[must_use]
    pub fn with_screenshot(self, bytes: Vec<u8>) -> Self {
        self.state().screenshot = Some(bytes);
        self
    }

    /// Every evaluation fails
    #[must_use]
    pub fn failing_evaluate(self) -> Self {
        self.state().faults.fail_evaluate = true;
        self
    }

    /// Every evaluation never completes
    #[must_use]
    pub fn hanging_evaluate(self) -> Self {
        self.state().faults.hang_evaluate = true;
        self
    }

    /// Element geometry lookups never complete
    #[must_use]
    pub fn hanging_bounding_box(self) -> Self {
        self.state().faults.hang_bounding_box = true;
        self
    }

    /// Every real action fails
    #[must_use]
    pub fn failing_actions(self) -> Self {
        self.state().faults.fail_actions = true;
        self
    }

    /// Call history, one entry per driver call
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(prefix))
    }

    /// Number of script evaluations
    #[must_use]
    pub fn evaluate_count(&self) -> usize {
        self.state().evaluations
    }

    /// Number of registered init scripts
    #[must_use]
    pub fn init_script_count(&self) -> usize {
        self.state().init_scripts.len()
    }

    /// Snapshot of the modelled runtime
    #[must_use]
    pub fn runtime(&self) -> RuntimeModel {
        self.state().runtime.clone()
    }

    /// Runtime commands received by the current document, in order
    #[must_use]
    pub fn runtime_calls(&self) -> Vec<RuntimeCall> {
        self.state().calls.clone()
    }

    /// Operation names of [`Self::runtime_calls`]
    #[must_use]
    pub fn runtime_ops(&self) -> Vec<&'static str> {
        self.state().calls.iter().map(RuntimeCall::op).collect()
    }

    /// Instances of the node with `id` in the document
    #[must_use]
    pub fn node_count(&self, id: &str) -> usize {
        self.state().runtime.nodes.get(id).copied().unwrap_or(0)
    }

    /// Current value of an input element
    #[must_use]
    pub fn value(&self, locator: &Locator) -> Option<String> {
        self.state().elements.get(locator).map(|e| e.value.clone())
    }

    /// `input` events the element has fired
    #[must_use]
    pub fn input_events(&self, locator: &Locator) -> usize {
        self.state()
            .elements
            .get(locator)
            .map_or(0, |e| e.input_events)
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> String {
        self.state().url.clone()
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn navigate(&mut self, url: &str) -> VisualResult<()> {
        let mut state = self.state();
        state.record(format!("navigate:{url}"));
        state.url = url.to_string();
        state.focused = None;
        state.calls.clear();
        state.runtime = RuntimeModel::default();
        if state
            .init_scripts
            .iter()
            .any(|script| script.contains(INJECTION_MARKER))
        {
            state.runtime.inject();
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> VisualResult<Value> {
        let (hang, delay, result) = {
            let mut state = self.state();
            state.evaluations += 1;
            let dispatched = parse_dispatch(script);
            match &dispatched {
                Some(call) => state.record(format!("runtime:{}", call.op())),
                None if script.contains(INJECTION_MARKER) => state.record("inject"),
                None => state.record("evaluate"),
            }

            if state.faults.hang_evaluate {
                (true, Duration::ZERO, Ok(Value::Null))
            } else if state.faults.fail_evaluate {
                (
                    false,
                    Duration::ZERO,
                    Err(VisualError::evaluation("script threw")),
                )
            } else if let Some(call) = dispatched {
                if state.runtime.injected {
                    let MockState {
                        runtime,
                        elements,
                        calls,
                        ..
                    } = &mut *state;
                    let value = runtime.apply(&call, elements);
                    let delay = match call {
                        RuntimeCall::Move { duration_ms, .. } => Duration::from_millis(duration_ms),
                        _ => Duration::ZERO,
                    };
                    calls.push(call);
                    (false, delay, Ok(value))
                } else {
                    (false, Duration::ZERO, Ok(Value::Null))
                }
            } else if script.contains(INJECTION_MARKER) {
                (false, Duration::ZERO, Ok(state.runtime.inject()))
            } else {
                (false, Duration::ZERO, Ok(Value::Null))
            }
        };

        if hang {
            return futures::future::pending().await;
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn add_init_script(&self, script: &str) -> VisualResult<()> {
        let mut state = self.state();
        state.record("add_init_script");
        state.init_scripts.push(script.to_string());
        Ok(())
    }

    async fn bounding_box(&self, locator: &Locator) -> VisualResult<Option<BoundingBox>> {
        let (hang, bounds) = {
            let mut state = self.state();
            state.record(format!("bounding_box:{locator}"));
            (
                state.faults.hang_bounding_box,
                state.elements.get(locator).map(|e| e.bounds),
            )
        };
        if hang {
            return futures::future::pending().await;
        }
        Ok(bounds)
    }

    async fn click(&self, locator: &Locator) -> VisualResult<()> {
        let mut state = self.state();
        state.action("click", locator)?;
        state.focused = Some(locator.clone());
        Ok(())
    }

    async fn dblclick(&self, locator: &Locator) -> VisualResult<()> {
        let mut state = self.state();
        state.action("dblclick", locator)?;
        state.focused = Some(locator.clone());
        Ok(())
    }

    async fn right_click(&self, locator: &Locator) -> VisualResult<()> {
        self.state().action("right_click", locator)
    }

    async fn hover(&self, locator: &Locator) -> VisualResult<()> {
        self.state().action("hover", locator)
    }

    async fn fill(&self, locator: &Locator, value: &str) -> VisualResult<()> {
        let mut state = self.state();
        state.action("fill", locator)?;
        state.focused = Some(locator.clone());
        if let Some(element) = state.elements.get_mut(locator) {
            // An unchanged value fires no input event.
            if element.value != value {
                element.value = value.to_string();
                element.input_events += 1;
            }
        }
        Ok(())
    }

    async fn press_char(&self, ch: char) -> VisualResult<()> {
        let mut state = self.state();
        state.record(format!("press:{ch}"));
        if state.faults.fail_actions {
            return Err(VisualError::input(format!("key {ch:?} rejected")));
        }
        let Some(focused) = state.focused.clone() else {
            return Ok(());
        };
        if let Some(element) = state.elements.get_mut(&focused) {
            element.value.push(ch);
            element.input_events += 1;
        }
        Ok(())
    }

    async fn screenshot_jpeg(&self, quality: u8) -> VisualResult<Vec<u8>> {
        let mut state = self.state();
        state.record(format!("screenshot:{quality}"));
        state.screenshot.clone().ok_or_else(|| VisualError::Screenshot {
            message: "no screenshot configured".to_string(),
        })
    }
}
