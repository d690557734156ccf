//! Instrumented page wrapper.
//!
//! [`VisualPage`] decorates a [`PageDriver`] with the per-page visual state:
//! the runtime handle (injection flag and cursor mirror) and the narrator's
//! story state. Navigation goes through [`VisualPage::goto`], which clears
//! per-document state and re-injects, so a fresh document never keeps a
//! stale flag.

use crate::driver::PageDriver;
use crate::mode::ModeConfig;
use crate::result::VisualResult;
use crate::runtime::{PageRuntime, RuntimeCall};
use crate::story::StoryState;
use crate::style::Theme;
use crate::timing::{guarded, Timings};
use std::sync::Arc;
use std::time::Duration;

/// Settings shared by a fixture and every handle it gives out
#[derive(Debug, Clone, Default)]
pub struct VisualContext {
    /// Resolved mode
    pub mode: ModeConfig,
    /// Presentation delays
    pub timings: Timings,
}

impl VisualContext {
    /// Create a context
    #[must_use]
    pub const fn new(mode: ModeConfig, timings: Timings) -> Self {
        Self { mode, timings }
    }
}

/// A driver page with visual instrumentation attached
#[derive(Debug)]
pub struct VisualPage<D: PageDriver> {
    driver: D,
    runtime: PageRuntime,
    story: StoryState,
    context: Arc<VisualContext>,
    armed: bool,
}

impl<D: PageDriver> VisualPage<D> {
    /// Wrap `driver`. Nothing is sent to the page until [`Self::attach`].
    #[must_use]
    pub fn new(driver: D, context: Arc<VisualContext>, theme: &Theme) -> Self {
        Self {
            driver,
            runtime: PageRuntime::new(theme),
            story: StoryState::default(),
            context,
            armed: false,
        }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Underlying driver, mutably
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Unwrap the driver
    #[must_use]
    pub fn into_inner(self) -> D {
        self.driver
    }

    /// Resolved mode
    #[must_use]
    pub fn mode(&self) -> &ModeConfig {
        &self.context.mode
    }

    /// Presentation delays
    #[must_use]
    pub fn timings(&self) -> &Timings {
        &self.context.timings
    }

    /// Shared context
    #[must_use]
    pub fn context(&self) -> &Arc<VisualContext> {
        &self.context
    }

    /// Host-side runtime handle
    #[must_use]
    pub const fn runtime(&self) -> &PageRuntime {
        &self.runtime
    }

    /// Narrator state for this page
    #[must_use]
    pub const fn story_state(&self) -> &StoryState {
        &self.story
    }

    pub(crate) fn story_state_mut(&mut self) -> &mut StoryState {
        &mut self.story
    }

    /// Visual mode is on
    #[must_use]
    pub fn is_visual(&self) -> bool {
        self.context.mode.visual_enabled
    }

    /// Arm the page: register the runtime for future documents and inject
    /// it into the current one. Does nothing outside visual mode.
    pub async fn attach(&mut self) {
        if !self.is_visual() {
            return;
        }
        if !self.armed {
            let limit = self.context.mode.effect_timeout();
            let script = self.runtime.injection_script().to_string();
            self.armed = guarded("init_script", limit, self.driver.add_init_script(&script))
                .await
                .is_some();
        }
        self.ensure_injected().await;
        tracing::debug!("visual page attached");
    }

    /// Navigate and re-inject into the new document.
    ///
    /// Only the navigation's own error is returned.
    pub async fn goto(&mut self, url: &str) -> VisualResult<()> {
        self.driver.navigate(url).await?;
        if self.is_visual() {
            self.runtime.invalidate();
            self.story = StoryState::default();
            self.ensure_injected().await;
        }
        Ok(())
    }

    /// Inject unless the current document already has the runtime.
    pub(crate) async fn ensure_injected(&mut self) -> bool {
        if self.runtime.is_injected() {
            return true;
        }
        let limit = self.context.mode.effect_timeout();
        guarded("inject", limit, self.runtime.inject(&self.driver))
            .await
            .is_some()
    }

    /// Send one command, bounded by the effect timeout.
    pub(crate) async fn effect(&mut self, call: RuntimeCall) -> Option<serde_json::Value> {
        let limit = self.context.mode.effect_timeout();
        self.effect_within(call, limit).await
    }

    /// Send one command, bounded by `limit`.
    ///
    /// Returns `None` outside visual mode, or when the command failed or
    /// timed out.
    pub(crate) async fn effect_within(
        &mut self,
        call: RuntimeCall,
        limit: Duration,
    ) -> Option<serde_json::Value> {
        if !self.is_visual() || !self.ensure_injected().await {
            return None;
        }
        guarded(call.op(), limit, self.runtime.call(&self.driver, &call)).await
    }

    /// Clear highlight and focus state, and hide the result overlay.
    pub async fn reset_effects(&mut self) {
        if !self.is_visual() {
            return;
        }
        self.effect(RuntimeCall::UnhighlightCurrent).await;
        self.effect(RuntimeCall::FocusReset).await;
        self.effect(RuntimeCall::HideResult).await;
    }
}
