//! Probar Visual: watchable browser tests
//!
//! An instrumentation layer for browser test suites. In visual mode every
//! interaction is preceded by an animated cursor gliding to its target, the
//! element is outlined, clicks ripple, a BDD story panel narrates the
//! scenario step by step, and the test ends on a pass/fail overlay. With
//! visual mode off every call is a plain passthrough to the driver.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        PROBAR VISUAL                              │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ModeConfig ──► VisualFixture ──► VisualPage<D> ──► PageDriver    │
//! │  (env)          attach/run/        runtime handle    CdpPage      │
//! │                 teardown           story state       MockPage     │
//! │                    │                    ▲                         │
//! │                    ▼                    │ RuntimeCall (JSON)      │
//! │              Cursor / Story ──► animator ──► window.__probarVisual │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use probar_visual::{Locator, MockPage, StoryStep, TestInfo, VisualFixture};
//!
//! # async fn demo() -> probar_visual::VisualResult<()> {
//! let fixture = VisualFixture::from_env();
//! let info = TestInfo::new("adds a user").with_project("chromium");
//! fixture
//!     .run(MockPage::new(), &info, |page, cursor, story| {
//!         Box::pin(async move {
//!             story
//!                 .setup(page, "Users", "Add", vec![StoryStep::when("I add a user")])
//!                 .await;
//!             story.step(page).await;
//!             cursor.click(page, &Locator::test_id("add")).await
//!         })
//!     })
//!     .await
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Cursor animation math
pub mod animation;

/// Host-side animation sequencing
#[allow(clippy::missing_errors_doc)]
pub mod animator;

#[cfg(feature = "browser")]
#[allow(
    clippy::missing_errors_doc,
    clippy::items_after_statements,
    clippy::cast_possible_truncation
)]
mod cdp;
mod cursor;
mod driver;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod fixture;
mod locator;
/// In-memory page for tests
pub mod mock;
mod mode;
mod page;
mod result;
/// Injected page runtime
pub mod runtime;
mod story;
/// Stylesheet generation
pub mod style;
#[cfg(feature = "media")]
mod thumbnail;
mod timing;

#[cfg(feature = "browser")]
pub use cdp::{CdpBrowser, CdpPage, LaunchConfig};
pub use cursor::Cursor;
pub use driver::PageDriver;
pub use fixture::{
    artifact_path, slugify, TestInfo, TestOutcome, VisualFixture, SCREENSHOT_QUALITY,
    THUMBNAIL_FILE, THUMBNAIL_TIMEOUT,
};
pub use locator::{BoundingBox, Locator, Point};
pub use mock::MockPage;
pub use mode::{
    ModeConfig, EFFECT_TIMEOUT_MS, ENV_ARTIFACT_DIR, ENV_FAST, ENV_GRID_WORKERS, ENV_RECORD,
    ENV_RUN_ID, ENV_SLOW_MO, ENV_VISUAL,
};
pub use page::{VisualContext, VisualPage};
pub use result::{VisualError, VisualResult};
pub use runtime::{CursorShape, PageRuntime, RuntimeCall, StoryStep};
pub use story::{NarratorPhase, Story, StoryState};
pub use style::{generate_styles, PanelPosition, Theme};
#[cfg(feature = "media")]
pub use thumbnail::{downscale, THUMBNAIL_MAX_WIDTH};
pub use timing::Timings;
