//! BDD story narration.
//!
//! A story is a feature name, a scenario name and an ordered list of steps
//! shown in a side panel. The host keeps the authoritative step index in
//! [`StoryState`] on each [`VisualPage`]; the page panel only renders it.
//!
//! ```text
//! Uninitialized ──setup──► Ready(-1) ──step──► Stepping(0..n-1) ──step──► Exhausted
//!       ▲                                                                    │
//!       └────────────────────────────── hide ───────────────────────────────┘
//! ```
//!
//! Every operation is a no-op unless panels are visible (visual mode on, not
//! in grid mode).

use crate::driver::PageDriver;
use crate::page::{VisualContext, VisualPage};
use crate::runtime::{RuntimeCall, StoryStep};
use crate::timing::ms;
use std::sync::Arc;

/// Where the narrator is in the current story
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarratorPhase {
    /// No story set up
    Uninitialized,
    /// Story shown, no step active yet
    Ready,
    /// Step `n` is active and more follow
    Stepping(usize),
    /// The last step is active
    Exhausted,
}

/// Host-side story of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryState {
    /// Feature name
    pub feature: String,
    /// Scenario name
    pub scenario: String,
    /// Ordered steps
    pub steps: Vec<StoryStep>,
    index: Option<usize>,
    initialized: bool,
}

impl StoryState {
    /// Fresh story with no active step
    #[must_use]
    pub fn new(
        feature: impl Into<String>,
        scenario: impl Into<String>,
        steps: Vec<StoryStep>,
    ) -> Self {
        Self {
            feature: feature.into(),
            scenario: scenario.into(),
            steps,
            index: None,
            initialized: true,
        }
    }

    /// Active step index, -1 before the first step
    #[must_use]
    pub fn current_step_index(&self) -> i32 {
        self.index.map_or(-1, |i| i as i32)
    }

    /// Active step
    #[must_use]
    pub fn current_step(&self) -> Option<&StoryStep> {
        self.index.and_then(|i| self.steps.get(i))
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> NarratorPhase {
        if !self.initialized {
            return NarratorPhase::Uninitialized;
        }
        match self.index {
            None if self.steps.is_empty() => NarratorPhase::Exhausted,
            None => NarratorPhase::Ready,
            Some(i) if i + 1 >= self.steps.len() => NarratorPhase::Exhausted,
            Some(i) => NarratorPhase::Stepping(i),
        }
    }

    /// Index the next step would activate, `None` when there is none
    fn next_index(&self) -> Option<usize> {
        let next = self.index.map_or(0, |i| i + 1);
        (self.initialized && next < self.steps.len()).then_some(next)
    }
}

/// Narration handle.
///
/// Cheap to clone; all state lives on the page.
#[derive(Debug, Clone)]
pub struct Story {
    context: Arc<VisualContext>,
}

impl Story {
    /// Create a narrator sharing `context`
    #[must_use]
    pub const fn new(context: Arc<VisualContext>) -> Self {
        Self { context }
    }

    fn enabled(&self) -> bool {
        self.context.mode.panels_visible()
    }

    /// Show a story with every step pending.
    ///
    /// With the focus toggle enabled the panel stays hidden until the first
    /// step reveals it.
    pub async fn setup<D: PageDriver>(
        &self,
        page: &mut VisualPage<D>,
        feature: &str,
        scenario: &str,
        steps: Vec<StoryStep>,
    ) {
        if !self.enabled() {
            return;
        }
        let call = RuntimeCall::SetStory {
            feature: feature.to_string(),
            scenario: scenario.to_string(),
            steps: steps.clone(),
            start_hidden: self.context.mode.focus_toggle_enabled(),
        };
        *page.story_state_mut() = StoryState::new(feature, scenario, steps);
        page.effect(call).await;
        tokio::time::sleep(ms(self.context.timings.story_fade_in_ms)).await;
    }

    /// Activate the next step. Past the last step nothing changes.
    pub async fn step<D: PageDriver>(&self, page: &mut VisualPage<D>) {
        if !self.enabled() {
            return;
        }
        let state = page.story_state();
        let Some(next) = state.next_index() else {
            tracing::debug!(phase = ?state.phase(), "no step to advance to");
            return;
        };
        let first = next == 0;
        page.story_state_mut().index = Some(next);

        let timings = self.context.timings;
        if first {
            page.effect(RuntimeCall::AdvanceStep).await;
            tokio::time::sleep(ms(timings.step_reveal_ms)).await;
        } else if self.context.mode.focus_toggle_enabled() {
            page.effect(RuntimeCall::FocusStory).await;
            tokio::time::sleep(ms(timings.focus_dim_ms)).await;
            page.effect(RuntimeCall::AdvanceStep).await;
            tokio::time::sleep(ms(timings.focus_dim_ms)).await;
            page.effect(RuntimeCall::FocusReset).await;
        } else {
            page.effect(RuntimeCall::AdvanceStep).await;
        }
    }

    /// Hide the panel and forget the story
    pub async fn hide<D: PageDriver>(&self, page: &mut VisualPage<D>) {
        if !self.enabled() {
            return;
        }
        *page.story_state_mut() = StoryState::default();
        page.effect(RuntimeCall::HideStory).await;
    }

    /// Dim the page and lift the story panel
    pub async fn focus<D: PageDriver>(&self, page: &mut VisualPage<D>) {
        if !self.enabled() {
            return;
        }
        page.effect(RuntimeCall::FocusStory).await;
    }

    /// Bring the page back to the front
    pub async fn unfocus<D: PageDriver>(&self, page: &mut VisualPage<D>) {
        if !self.enabled() {
            return;
        }
        page.effect(RuntimeCall::FocusPage).await;
    }
}
