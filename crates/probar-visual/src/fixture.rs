//! Per-test fixture lifecycle.
//!
//! [`VisualFixture`] is the entry point a test suite holds. For each test it
//! wraps the driver page in a [`VisualPage`], arms injection, hands the test
//! body a [`Cursor`] and a [`Story`], and on teardown shows the pass/fail
//! overlay and optionally writes a thumbnail:
//!
//! ```text
//! <root>/<run-id>/worker-<n>/<test-slug>-<project>/thumbnail.jpg
//! ```
//!
//! Nothing in teardown can fail the test; the body's own result is returned
//! unchanged.

use crate::cursor::Cursor;
use crate::driver::PageDriver;
use crate::mode::ModeConfig;
use crate::page::{VisualContext, VisualPage};
use crate::result::{VisualError, VisualResult};
use crate::runtime::RuntimeCall;
use crate::story::Story;
use crate::style::Theme;
use crate::timing::{guarded, Timings};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// File name of the per-test thumbnail
pub const THUMBNAIL_FILE: &str = "thumbnail.jpg";

/// JPEG quality requested from the driver
pub const SCREENSHOT_QUALITY: u8 = 85;

/// Upper bound on capturing and writing the thumbnail
pub const THUMBNAIL_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest slug kept in artifact directory names
const MAX_SLUG_LEN: usize = 80;

/// Outcome of a test body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    /// Body returned `Ok`
    Passed,
    /// Body returned `Err`
    Failed,
}

impl TestOutcome {
    /// Outcome of a body result
    #[must_use]
    pub const fn from_result<T>(result: &VisualResult<T>) -> Self {
        match result {
            Ok(_) => Self::Passed,
            Err(_) => Self::Failed,
        }
    }

    /// Test passed
    #[must_use]
    pub const fn is_passed(self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Identity of the running test, as supplied by the runner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestInfo {
    /// Test title
    pub title: String,
    /// Project (browser/config) name
    pub project: String,
    /// Worker index
    pub worker_index: u32,
    /// Run identifier
    pub run_id: Option<String>,
    /// Artifact root
    pub output_root: Option<PathBuf>,
}

impl TestInfo {
    /// Create test info with a title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set project name
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Set worker index
    #[must_use]
    pub const fn with_worker(mut self, index: u32) -> Self {
        self.worker_index = index;
        self
    }

    /// Set run identifier
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Set artifact root
    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }

    /// Directory name for this test: `<slug>-<project>`, or just the slug
    #[must_use]
    pub fn dir_name(&self) -> String {
        let slug = slugify(&self.title);
        if self.project.trim().is_empty() {
            slug
        } else {
            format!("{slug}-{}", slugify(&self.project))
        }
    }
}

/// Lowercase ASCII alphanumerics with single dashes between words.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("test");
    }
    slug
}

/// Thumbnail location for a test
#[must_use]
pub fn artifact_path(root: &Path, run_id: &str, info: &TestInfo) -> PathBuf {
    root.join(run_id)
        .join(format!("worker-{}", info.worker_index))
        .join(info.dir_name())
        .join(THUMBNAIL_FILE)
}

/// Visual instrumentation for a test suite
#[derive(Debug, Clone)]
pub struct VisualFixture {
    context: Arc<VisualContext>,
    theme: Theme,
    default_run_id: String,
}

impl VisualFixture {
    /// Create a fixture for `mode` with default theme and timings
    #[must_use]
    pub fn new(mode: ModeConfig) -> Self {
        Self {
            context: Arc::new(VisualContext::new(mode, Timings::default())),
            theme: Theme::default(),
            default_run_id: chrono::Local::now().format("%Y%m%d-%H%M%S").to_string(),
        }
    }

    /// Create a fixture from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ModeConfig::from_env())
    }

    /// Set the theme
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set presentation delays
    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.context = Arc::new(VisualContext::new(self.context.mode.clone(), timings));
        self
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

    /// Theme used for new pages
    #[must_use]
    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Cursor handle
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::new(Arc::clone(&self.context))
    }

    /// Story handle
    #[must_use]
    pub fn story(&self) -> Story {
        Story::new(Arc::clone(&self.context))
    }

    /// Wrap `driver` and arm injection for its current and future documents
    pub async fn attach<D: PageDriver>(&self, driver: D) -> VisualPage<D> {
        let mut page = VisualPage::new(driver, Arc::clone(&self.context), &self.theme);
        page.attach().await;
        page
    }

    /// Where the thumbnail for `info` goes, when recording is possible
    #[must_use]
    pub fn thumbnail_path(&self, info: &TestInfo) -> Option<PathBuf> {
        let mode = &self.context.mode;
        if !mode.record_enabled {
            return None;
        }
        let root = info.output_root.as_ref().or(mode.artifact_root.as_ref())?;
        let run_id = info
            .run_id
            .as_deref()
            .or(mode.run_id.as_deref())
            .unwrap_or(&self.default_run_id);
        Some(artifact_path(root, run_id, info))
    }

    /// Show the outcome and capture the thumbnail.
    ///
    /// Returns the thumbnail path when one was written.
    pub async fn teardown<D: PageDriver>(
        &self,
        page: &mut VisualPage<D>,
        info: &TestInfo,
        outcome: TestOutcome,
    ) -> Option<PathBuf> {
        if page.is_visual() {
            let passed = outcome.is_passed();
            tracing::info!(test = %info.title, passed, "showing result");
            page.reset_effects().await;
            page.effect(RuntimeCall::ShowResult { passed }).await;
            tokio::time::sleep(self.context.timings.result_hold(passed)).await;
        }

        let path = self.thumbnail_path(info)?;
        guarded(
            "thumbnail",
            THUMBNAIL_TIMEOUT,
            write_thumbnail(page.driver(), &path),
        )
        .await?;
        tracing::info!(path = %path.display(), "thumbnail written");
        Some(path)
    }

    /// Run one test body with instrumentation around it.
    ///
    /// The outcome shown at teardown is derived from the body's result,
    /// which is returned unchanged. A panicking body is torn down as a
    /// failure and the panic is then resumed.
    pub async fn run<D, T, F>(&self, driver: D, info: &TestInfo, body: F) -> VisualResult<T>
    where
        D: PageDriver,
        F: for<'a> FnOnce(&'a mut VisualPage<D>, Cursor, Story) -> BoxFuture<'a, VisualResult<T>>,
    {
        let mut page = self.attach(driver).await;
        let caught = AssertUnwindSafe(body(&mut page, self.cursor(), self.story()))
            .catch_unwind()
            .await;
        match caught {
            Ok(result) => {
                if let (true, Err(error)) = (page.is_visual(), &result) {
                    tracing::debug!(test = %info.title, %error, "test body failed");
                }
                self.teardown(&mut page, info, TestOutcome::from_result(&result))
                    .await;
                result
            }
            Err(panic) => {
                if page.is_visual() {
                    tracing::debug!(test = %info.title, "test body panicked");
                }
                self.teardown(&mut page, info, TestOutcome::Failed).await;
                std::panic::resume_unwind(panic)
            }
        }
    }
}

async fn write_thumbnail<D: PageDriver>(driver: &D, path: &Path) -> VisualResult<()> {
    let screenshot = driver.screenshot_jpeg(SCREENSHOT_QUALITY).await?;
    if screenshot.is_empty() {
        return Err(VisualError::Screenshot {
            message: "empty screenshot".to_string(),
        });
    }
    #[cfg(feature = "media")]
    let bytes = crate::thumbnail::downscale(&screenshot)?;
    #[cfg(not(feature = "media"))]
    let bytes = screenshot;

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
