//! PageDriver - the browser automation collaborator.
//!
//! The instrumentation layer never drives the browser itself. Everything it
//! needs from a page (script evaluation, element geometry, the real input
//! primitives, screenshots) goes through this trait, so the same code runs
//! against chromium over CDP ([`crate::CdpPage`], feature `browser`) or
//! against the in-memory [`crate::MockPage`].
//!
//! ```text
//! ┌──────────────┐   RuntimeCall JSON   ┌──────────────────────┐
//! │ Cursor/Story │ ───── evaluate ────► │ window.__probarVisual │
//! │ (host side)  │                      │ (page side)           │
//! └──────┬───────┘                      └──────────────────────┘
//!        │ click / fill / hover ...
//!        ▼
//! ┌──────────────┐
//! │  PageDriver  │  CdpPage | MockPage | your own
//! └──────────────┘
//! ```

use crate::locator::{BoundingBox, Locator};
use crate::result::VisualResult;
use async_trait::async_trait;

/// Abstract page handle for browser automation.
///
/// Implementations must be cheap to call concurrently with timers; none of
/// the methods are expected to hold locks across their own awaits longer
/// than the underlying protocol round-trip.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL. Produces a fresh document.
    async fn navigate(&mut self, url: &str) -> VisualResult<()>;

    /// Evaluate a JavaScript expression, awaiting it if it is a promise.
    async fn evaluate(&self, script: &str) -> VisualResult<serde_json::Value>;

    /// Run `script` at the start of every future document.
    async fn add_init_script(&self, script: &str) -> VisualResult<()>;

    /// On-screen bounds, or `None` when the element is missing or not rendered.
    async fn bounding_box(&self, locator: &Locator) -> VisualResult<Option<BoundingBox>>;

    /// Click element
    async fn click(&self, locator: &Locator) -> VisualResult<()>;

    /// Double-click element
    async fn dblclick(&self, locator: &Locator) -> VisualResult<()>;

    /// Right-click element
    async fn right_click(&self, locator: &Locator) -> VisualResult<()>;

    /// Hover element
    async fn hover(&self, locator: &Locator) -> VisualResult<()>;

    /// Focus the element and replace its value in one step
    async fn fill(&self, locator: &Locator, value: &str) -> VisualResult<()>;

    /// Send one keystroke producing `ch` to the focused element
    async fn press_char(&self, ch: char) -> VisualResult<()>;

    /// Capture the viewport as JPEG
    async fn screenshot_jpeg(&self, quality: u8) -> VisualResult<Vec<u8>>;
}
