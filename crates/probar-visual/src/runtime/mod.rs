//! Injected page runtime.
//!
//! The page side is a self-contained script (`scripts/page_runtime.js`)
//! that builds the instrumentation nodes once per document and exposes a
//! control object on `window.__probarVisual`. [`PageRuntime`] is its
//! host-side handle: it owns the one-shot injection flag for the current
//! document, the last cursor position it sent, and renders typed
//! [`RuntimeCall`]s into dispatch expressions.

pub mod command;

pub use command::{CursorShape, RuntimeCall, StoryStep};

use crate::driver::PageDriver;
use crate::locator::Point;
use crate::result::VisualResult;
use crate::style::{generate_styles, Theme};

/// Page runtime bundle, a single function expression `(css, options) => bool`.
pub const PAGE_RUNTIME_JS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/scripts/page_runtime.js"
));

/// Global marker set by the runtime once its nodes exist
pub const INJECTION_MARKER: &str = "__probarVisualInjected";

/// Prefix of every dispatch expression
pub const DISPATCH_PREFIX: &str = "(window.__probarVisual ? window.__probarVisual.dispatch(";

/// Suffix of every dispatch expression
pub const DISPATCH_SUFFIX: &str = ") : null)";

/// Where the cursor rests in a fresh document
pub const CURSOR_HOME: Point = Point::new(24.0, 24.0);

/// Host-side handle to the runtime of one page.
#[derive(Debug, Clone)]
pub struct PageRuntime {
    script: String,
    injected: bool,
    cursor: Point,
    shape: CursorShape,
}

impl PageRuntime {
    /// Prepare the injection script for `theme`.
    #[must_use]
    pub fn new(theme: &Theme) -> Self {
        Self {
            script: injection_script(&generate_styles(theme)),
            injected: false,
            cursor: CURSOR_HOME,
            shape: CursorShape::Pointer,
        }
    }

    /// Full injection expression, stylesheet included
    #[must_use]
    pub fn injection_script(&self) -> &str {
        &self.script
    }

    /// Whether the current document has been injected
    #[must_use]
    pub const fn is_injected(&self) -> bool {
        self.injected
    }

    /// Last cursor position sent to the page
    #[must_use]
    pub const fn cursor(&self) -> Point {
        self.cursor
    }

    /// Last cursor shape sent to the page
    #[must_use]
    pub const fn shape(&self) -> CursorShape {
        self.shape
    }

    /// Inject into the current document unless already done.
    ///
    /// Returns `Ok(true)` when this call performed the injection. The page
    /// script checks its own marker as well, so a document that was injected
    /// by an init script is left untouched.
    pub async fn inject<D: PageDriver + ?Sized>(&mut self, driver: &D) -> VisualResult<bool> {
        if self.injected {
            return Ok(false);
        }
        driver.evaluate(&self.script).await?;
        self.injected = true;
        tracing::trace!("page runtime injected");
        Ok(true)
    }

    /// Forget per-document state after a navigation.
    pub fn invalidate(&mut self) {
        self.injected = false;
        self.cursor = CURSOR_HOME;
        self.shape = CursorShape::Pointer;
    }

    /// Send one command to the page.
    ///
    /// The cursor mirror is updated before the page answers: an animation
    /// that outlives the host's timeout still lands on its target.
    pub async fn call<D: PageDriver + ?Sized>(
        &mut self,
        driver: &D,
        call: &RuntimeCall,
    ) -> VisualResult<serde_json::Value> {
        tracing::trace!(op = call.op(), "runtime call");
        match call {
            RuntimeCall::Move { x, y, .. } => self.cursor = Point::new(*x, *y),
            RuntimeCall::SetCursorShape { shape } | RuntimeCall::QueueShapeChange { shape } => {
                self.shape = *shape;
            }
            _ => {}
        }
        driver.evaluate(&dispatch_script(call)?).await
    }
}

/// Wrap the runtime bundle with its arguments into one expression.
#[must_use]
pub fn injection_script(css: &str) -> String {
    let options = serde_json::json!({ "home": CURSOR_HOME });
    format!(
        "({PAGE_RUNTIME_JS})({}, {options})",
        serde_json::Value::String(css.to_string())
    )
}

/// Render a command as a dispatch expression.
pub fn dispatch_script(call: &RuntimeCall) -> VisualResult<String> {
    let payload = serde_json::to_string(call)?;
    Ok(format!("{DISPATCH_PREFIX}{payload}{DISPATCH_SUFFIX}"))
}

/// Recover the command from a dispatch expression.
#[must_use]
pub fn parse_dispatch(script: &str) -> Option<RuntimeCall> {
    let payload = script
        .strip_prefix(DISPATCH_PREFIX)?
        .strip_suffix(DISPATCH_SUFFIX)?;
    serde_json::from_str(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Locator;
    use crate::mock::MockPage;
    use crate::style::names;

    mod script_tests {
        use super::*;

        #[test]
        fn test_bundle_checks_flag_first() {
            let flag_check = PAGE_RUNTIME_JS.find("if (window[FLAG])").unwrap();
            let first_node = PAGE_RUNTIME_JS.find("singleton(").unwrap();
            assert!(flag_check < first_node);
            assert!(PAGE_RUNTIME_JS.contains(INJECTION_MARKER));
        }

        #[test]
        fn test_bundle_reuses_nodes_by_id() {
            assert!(PAGE_RUNTIME_JS.contains("document.getElementById(id)"));
            for id in names::NODE_IDS {
                assert!(
                    PAGE_RUNTIME_JS.contains(&format!("'{id}'")),
                    "bundle never creates #{id}"
                );
            }
        }

        #[test]
        fn test_bundle_nodes_are_inert() {
            assert!(PAGE_RUNTIME_JS.contains("aria-hidden"));
            assert!(PAGE_RUNTIME_JS.contains("el.inert = true"));
        }

        #[test]
        fn test_bundle_handles_every_op() {
            let calls = [
                RuntimeCall::Move { x: 0.0, y: 0.0, cx: 0.0, cy: 0.0, duration_ms: 0 },
                RuntimeCall::SetCursorShape { shape: CursorShape::Text },
                RuntimeCall::QueueShapeChange { shape: CursorShape::Text },
                RuntimeCall::Click,
                RuntimeCall::Highlight { locator: Locator::css("a") },
                RuntimeCall::UnhighlightCurrent,
                RuntimeCall::SetStory {
                    feature: String::new(),
                    scenario: String::new(),
                    steps: Vec::new(),
                    start_hidden: false,
                },
                RuntimeCall::AdvanceStep,
                RuntimeCall::HideStory,
                RuntimeCall::ShowResult { passed: true },
                RuntimeCall::HideResult,
                RuntimeCall::FocusStory,
                RuntimeCall::FocusPage,
                RuntimeCall::FocusReset,
            ];
            for call in calls {
                assert!(
                    PAGE_RUNTIME_JS.contains(&format!("{}: ", call.op())),
                    "dispatcher has no entry for {}",
                    call.op()
                );
            }
        }

        #[test]
        fn test_highlight_clears_previous_first() {
            let body = &PAGE_RUNTIME_JS[PAGE_RUNTIME_JS.find("function highlight(").unwrap()..];
            let clear = body.find("unhighlightCurrent()").unwrap();
            let mark = body.find("classList.add('pv-highlight')").unwrap();
            assert!(clear < mark);
        }

        #[test]
        fn test_injection_script_embeds_css_literal() {
            let script = injection_script("#pv-cursor { color: \"red\"; }");
            assert!(script.starts_with("(function (css, options)"));
            assert!(script.contains(r##""#pv-cursor { color: \"red\"; }""##));
            assert!(script.contains(r#"{"home":{"x":24.0,"y":24.0}}"#));
        }

        #[test]
        fn test_dispatch_round_trip() {
            let call = RuntimeCall::Highlight {
                locator: Locator::test_id("save"),
            };
            let script = dispatch_script(&call).unwrap();
            assert!(script.starts_with(DISPATCH_PREFIX));
            assert_eq!(parse_dispatch(&script), Some(call));
            assert_eq!(parse_dispatch("document.title"), None);
        }
    }

    mod handle_tests {
        use super::*;

        #[tokio::test]
        async fn test_inject_once_per_document() {
            let page = MockPage::new();
            let mut runtime = PageRuntime::new(&Theme::default());

            assert!(runtime.inject(&page).await.unwrap());
            assert!(!runtime.inject(&page).await.unwrap());
            assert_eq!(page.evaluate_count(), 1);
            assert!(runtime.is_injected());
        }

        #[tokio::test]
        async fn test_double_injection_leaves_single_nodes() {
            let page = MockPage::new();
            let runtime = PageRuntime::new(&Theme::default());

            // Bypass the host flag: the page-side marker must hold on its own.
            page.evaluate(runtime.injection_script()).await.unwrap();
            page.evaluate(runtime.injection_script()).await.unwrap();

            for id in names::NODE_IDS {
                assert_eq!(page.node_count(id), 1, "duplicate #{id}");
            }
        }

        #[tokio::test]
        async fn test_invalidate_resets_document_state() {
            let page = MockPage::new();
            let mut runtime = PageRuntime::new(&Theme::default());
            runtime.inject(&page).await.unwrap();
            runtime
                .call(
                    &page,
                    &RuntimeCall::Move { x: 300.0, y: 200.0, cx: 0.0, cy: 0.0, duration_ms: 0 },
                )
                .await
                .unwrap();
            assert_eq!(runtime.cursor(), Point::new(300.0, 200.0));

            runtime.invalidate();
            assert!(!runtime.is_injected());
            assert_eq!(runtime.cursor(), CURSOR_HOME);
            assert!(runtime.inject(&page).await.unwrap());
        }

        #[tokio::test]
        async fn test_call_tracks_shape() {
            let page = MockPage::new();
            let mut runtime = PageRuntime::new(&Theme::default());
            runtime.inject(&page).await.unwrap();
            runtime
                .call(&page, &RuntimeCall::SetCursorShape { shape: CursorShape::Text })
                .await
                .unwrap();
            assert_eq!(runtime.shape(), CursorShape::Text);
            assert_eq!(page.runtime().cursor_shape, CursorShape::Text);
        }

        #[tokio::test]
        async fn test_call_surfaces_driver_errors() {
            let page = MockPage::new().failing_evaluate();
            let mut runtime = PageRuntime::new(&Theme::default());
            assert!(runtime.call(&page, &RuntimeCall::Click).await.is_err());
        }
    }
}
