//! Host-side animation sequencing.
//!
//! These functions decide when and where the page cursor goes. Every page
//! interaction is bounded by the effect timeout and every failure is
//! swallowed; only [`type_into`] performs a real action and only its errors
//! reach the caller. Outside visual mode the effects are strict no-ops.

use crate::animation::ArcPath;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::page::VisualPage;
use crate::result::VisualResult;
use crate::runtime::RuntimeCall;
use crate::timing::{guarded, ms};
use tokio::time::Instant;

/// Glide the cursor to the center of `locator`.
///
/// Returns `false` when the element could not be resolved in time, in which
/// case the cursor does not move. The whole call is bounded by the effect
/// timeout plus the travel time.
pub async fn animate_to<D: PageDriver>(page: &mut VisualPage<D>, locator: &Locator) -> bool {
    if !page.is_visual() {
        return false;
    }
    let limit = page.mode().effect_timeout();
    let duration = page.mode().scaled(ms(page.timings().move_ms));
    let deadline = Instant::now() + limit + duration;

    let bounds = guarded("bounding_box", limit, page.driver().bounding_box(locator)).await;
    let Some(target) = bounds.flatten().map(|b| b.center()) else {
        tracing::debug!(%locator, "cursor target not resolved");
        return false;
    };

    let path = ArcPath::between(page.runtime().cursor(), target);
    let call = RuntimeCall::Move {
        x: path.end.x,
        y: path.end.y,
        cx: path.control.x,
        cy: path.control.y,
        duration_ms: duration.as_millis() as u64,
    };
    let remaining = deadline.saturating_duration_since(Instant::now());
    page.effect_within(call, remaining).await;
    true
}

/// Outline `locator`, replacing any previous highlight, then pause.
pub async fn highlight<D: PageDriver>(page: &mut VisualPage<D>, locator: &Locator) {
    if !page.is_visual() {
        return;
    }
    page.effect(RuntimeCall::Highlight {
        locator: locator.clone(),
    })
    .await;
    let pause = page.mode().scaled(ms(page.timings().highlight_pause_ms));
    tokio::time::sleep(pause).await;
}

/// Ripple and bounce at the cursor, then pause.
pub async fn click<D: PageDriver>(page: &mut VisualPage<D>) {
    if !page.is_visual() {
        return;
    }
    page.effect(RuntimeCall::Click).await;
    let pause = page.mode().scaled(ms(page.timings().click_pause_ms));
    tokio::time::sleep(pause).await;
}

/// Type `text` into `locator`.
///
/// Fast mode (or non-visual mode) sets the whole value at once. Otherwise
/// the field is cleared and each character is sent as its own keystroke;
/// if that fails part way the value is set in bulk instead.
pub async fn type_into<D: PageDriver>(
    page: &mut VisualPage<D>,
    locator: &Locator,
    text: &str,
) -> VisualResult<()> {
    if !page.is_visual() || page.mode().fast_mode {
        return page.driver().fill(locator, text).await;
    }

    let delay = page.mode().scaled(ms(page.timings().type_char_ms));
    let driver = page.driver();
    let per_char = async {
        driver.fill(locator, "").await?;
        for ch in text.chars() {
            driver.press_char(ch).await?;
            tokio::time::sleep(delay).await;
        }
        Ok::<_, crate::result::VisualError>(())
    };

    match per_char.await {
        Ok(()) => Ok(()),
        Err(error) => {
            tracing::debug!(%locator, %error, "per-character typing failed, setting value");
            driver.fill(locator, text).await
        }
    }
}
