//! Cursor interaction facade.
//!
//! Each method performs exactly one real driver action and returns its
//! result unchanged. In visual mode the action is preceded by the cursor
//! gliding to the element, a highlight and (for clicks) a ripple, and
//! followed by a short fixed settle. Outside visual mode the call goes
//! straight to the driver.

use crate::animator;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::page::{VisualContext, VisualPage};
use crate::result::VisualResult;
use crate::runtime::{CursorShape, RuntimeCall};
use crate::timing::ms;
use std::sync::Arc;

/// Click feedback played before the real action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feedback {
    None,
    Single,
    Double,
}

/// Interaction handle.
///
/// Cheap to clone; all state lives on the page.
#[derive(Debug, Clone)]
pub struct Cursor {
    context: Arc<VisualContext>,
}

impl Cursor {
    /// Create a cursor sharing `context`
    #[must_use]
    pub const fn new(context: Arc<VisualContext>) -> Self {
        Self { context }
    }

    fn visual(&self) -> bool {
        self.context.mode.visual_enabled
    }

    async fn approach<D: PageDriver>(
        &self,
        page: &mut VisualPage<D>,
        locator: &Locator,
        feedback: Feedback,
    ) {
        animator::animate_to(page, locator).await;
        animator::highlight(page, locator).await;
        match feedback {
            Feedback::None => {}
            Feedback::Single => animator::click(page).await,
            Feedback::Double => {
                animator::click(page).await;
                tokio::time::sleep(ms(self.context.timings.double_click_gap_ms)).await;
                animator::click(page).await;
            }
        }
    }

    async fn settle(&self) {
        tokio::time::sleep(ms(self.context.timings.settle_ms)).await;
    }

    /// Click `locator`
    pub async fn click<D: PageDriver>(
        &self,
        page: &mut VisualPage<D>,
        locator: &Locator,
    ) -> VisualResult<()> {
        if !self.visual() {
            return page.driver().click(locator).await;
        }
        self.approach(page, locator, Feedback::Single).await;
        let result = page.driver().click(locator).await;
        self.settle().await;
        result
    }

    /// Double-click `locator`
    pub async fn dblclick<D: PageDriver>(
        &self,
        page: &mut VisualPage<D>,
        locator: &Locator,
    ) -> VisualResult<()> {
        if !self.visual() {
            return page.driver().dblclick(locator).await;
        }
        self.approach(page, locator, Feedback::Double).await;
        let result = page.driver().dblclick(locator).await;
        self.settle().await;
        result
    }

    /// Right-click `locator`
    pub async fn right_click<D: PageDriver>(
        &self,
        page: &mut VisualPage<D>,
        locator: &Locator,
    ) -> VisualResult<()> {
        if !self.visual() {
            return page.driver().right_click(locator).await;
        }
        self.approach(page, locator, Feedback::None).await;
        let result = page.driver().right_click(locator).await;
        self.settle().await;
        result
    }

    /// Hover `locator`
    pub async fn hover<D: PageDriver>(
        &self,
        page: &mut VisualPage<D>,
        locator: &Locator,
    ) -> VisualResult<()> {
        if !self.visual() {
            return page.driver().hover(locator).await;
        }
        self.approach(page, locator, Feedback::None).await;
        let result = page.driver().hover(locator).await;
        self.settle().await;
        result
    }

    /// Replace the value of `locator` with `value`.
    ///
    /// In visual mode the cursor turns into a text caret while typing.
    pub async fn fill<D: PageDriver>(
        &self,
        page: &mut VisualPage<D>,
        locator: &Locator,
        value: &str,
    ) -> VisualResult<()> {
        if !self.visual() {
            return page.driver().fill(locator, value).await;
        }
        self.approach(page, locator, Feedback::None).await;
        page.effect(RuntimeCall::SetCursorShape {
            shape: CursorShape::Text,
        })
        .await;
        let result = animator::type_into(page, locator, value).await;
        page.effect(RuntimeCall::SetCursorShape {
            shape: CursorShape::Pointer,
        })
        .await;
        self.settle().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::BoundingBox;
    use crate::mock::MockPage;
    use crate::mode::ModeConfig;
    use crate::result::VisualError;
    use crate::style::Theme;
    use crate::timing::Timings;
    use std::time::Duration;
    use tokio::time::Instant;

    fn save() -> Locator {
        Locator::test_id("save")
    }

    fn name() -> Locator {
        Locator::css("#name")
    }

    fn probe() -> MockPage {
        MockPage::new()
            .with_element(save(), BoundingBox::new(300.0, 400.0, 100.0, 40.0))
            .with_element(name(), BoundingBox::new(100.0, 100.0, 240.0, 32.0))
    }

    async fn setup(probe: &MockPage, mode: ModeConfig) -> (VisualPage<MockPage>, Cursor) {
        let context = Arc::new(VisualContext::new(mode, Timings::default()));
        let mut page = VisualPage::new(probe.clone(), Arc::clone(&context), &Theme::default());
        page.attach().await;
        (page, Cursor::new(context))
    }

    mod passthrough_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_non_visual_calls_driver_only() {
            let probe = probe();
            let (mut page, cursor) = setup(&probe, ModeConfig::default()).await;
            let start = Instant::now();

            cursor.click(&mut page, &save()).await.unwrap();
            cursor.fill(&mut page, &name(), "hello").await.unwrap();
            cursor.hover(&mut page, &save()).await.unwrap();
            cursor.dblclick(&mut page, &save()).await.unwrap();
            cursor.right_click(&mut page, &save()).await.unwrap();

            assert_eq!(
                probe.history(),
                vec![
                    "click:testid=save",
                    "fill:css=#name",
                    "hover:testid=save",
                    "dblclick:testid=save",
                    "right_click:testid=save",
                ]
            );
            assert_eq!(probe.evaluate_count(), 0);
            assert_eq!(start.elapsed(), Duration::ZERO);
        }

        #[tokio::test(start_paused = true)]
        async fn test_same_outcome_in_both_modes() {
            for mode in [ModeConfig::default(), ModeConfig::visual()] {
                let probe = probe();
                let (mut page, cursor) = setup(&probe, mode).await;
                cursor.fill(&mut page, &name(), "hello").await.unwrap();
                cursor.click(&mut page, &save()).await.unwrap();
                assert_eq!(probe.value(&name()).as_deref(), Some("hello"));

                let missing = cursor.click(&mut page, &Locator::css("#gone")).await;
                assert!(matches!(missing, Err(VisualError::ElementNotFound { .. })));
            }
        }
    }

    mod visual_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_click_sequence() {
            let probe = probe();
            let (mut page, cursor) = setup(&probe, ModeConfig::visual()).await;
            cursor.click(&mut page, &save()).await.unwrap();

            assert_eq!(probe.runtime_ops(), vec!["move", "highlight", "click"]);
            let history = probe.history();
            let ripple = history.iter().position(|h| h == "runtime:click").unwrap();
            let real = history.iter().position(|h| h == "click:testid=save").unwrap();
            assert!(ripple < real);
            assert_eq!(probe.runtime().highlighted, Some(save()));
        }

        #[tokio::test(start_paused = true)]
        async fn test_dblclick_plays_two_ripples() {
            let probe = probe();
            let (mut page, cursor) = setup(&probe, ModeConfig::visual()).await;
            cursor.dblclick(&mut page, &save()).await.unwrap();
            assert_eq!(probe.runtime().ripples, 2);
            assert!(probe.was_called("dblclick:testid=save"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_hover_and_right_click_skip_ripple() {
            let probe = probe();
            let (mut page, cursor) = setup(&probe, ModeConfig::visual()).await;
            cursor.hover(&mut page, &save()).await.unwrap();
            cursor.right_click(&mut page, &save()).await.unwrap();
            assert_eq!(probe.runtime().ripples, 0);
        }

        #[tokio::test(start_paused = true)]
        async fn test_fill_switches_caret() {
            let probe = probe();
            let (mut page, cursor) = setup(&probe, ModeConfig::visual()).await;
            cursor.fill(&mut page, &name(), "hello").await.unwrap();

            let shapes: Vec<CursorShape> = probe
                .runtime_calls()
                .into_iter()
                .filter_map(|call| match call {
                    RuntimeCall::SetCursorShape { shape } => Some(shape),
                    _ => None,
                })
                .collect();
            assert_eq!(shapes, vec![CursorShape::Text, CursorShape::Pointer]);
            assert_eq!(probe.runtime().cursor_shape, CursorShape::Pointer);
            assert_eq!(probe.input_events(&name()), 5);
        }

        #[tokio::test(start_paused = true)]
        async fn test_fast_fill_is_one_event() {
            let probe = probe();
            let (mut page, cursor) = setup(&probe, ModeConfig::visual().with_fast_mode(true)).await;
            cursor.fill(&mut page, &name(), "hello").await.unwrap();
            assert_eq!(probe.input_events(&name()), 1);
            assert_eq!(probe.value(&name()).as_deref(), Some("hello"));
        }
    }

    mod resilience_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_failing_page_still_clicks() {
            let probe = probe().failing_evaluate();
            let (mut page, cursor) = setup(&probe, ModeConfig::visual()).await;
            cursor.click(&mut page, &save()).await.unwrap();
            assert!(probe.was_called("click:testid=save"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_hanging_lookup_is_bounded() {
            let probe = probe().hanging_bounding_box();
            let (mut page, cursor) = setup(&probe, ModeConfig::visual()).await;
            let timings = Timings::default();
            let start = Instant::now();
            cursor.click(&mut page, &save()).await.unwrap();

            // Lookup bound + scaled pauses + settle; nothing waits on the hang.
            let bound = Duration::from_millis(500)
                + ModeConfig::visual().scaled(Duration::from_millis(
                    timings.highlight_pause_ms + timings.click_pause_ms,
                ))
                + Duration::from_millis(timings.settle_ms);
            assert!(start.elapsed() <= bound + Duration::from_millis(10));
            assert!(probe.was_called("click:testid=save"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_real_error_returned_unchanged() {
            let probe = probe().failing_actions();
            let (mut page, cursor) = setup(&probe, ModeConfig::visual()).await;
            let err = cursor.hover(&mut page, &save()).await.unwrap_err();
            assert!(matches!(err, VisualError::Input { .. }));
        }
    }
}
