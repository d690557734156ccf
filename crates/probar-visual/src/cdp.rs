//! Chromium driver over CDP (feature `browser`).
//!
//! [`CdpBrowser`] launches chromium; [`CdpPage`] implements [`PageDriver`]
//! on one of its tabs. Real input goes through the `Input` domain so the
//! page sees trusted events; element geometry and value setting go through
//! script evaluation.

use crate::driver::PageDriver;
use crate::locator::{js_string, BoundingBox, Locator, Point};
use crate::mode::ModeConfig;
use crate::result::{VisualError, VisualResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

/// Browser launch options
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Run without a window
    pub headless: bool,
    /// Chromium sandbox
    pub sandbox: bool,
    /// Chromium executable, auto-detected when `None`
    pub chromium_path: Option<PathBuf>,
    /// Window width
    pub width: u32,
    /// Window height
    pub height: u32,
    /// Wait after every real input action on pages of this browser
    pub slow_mo: Duration,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chromium_path: None,
            width: 1280,
            height: 720,
            slow_mo: Duration::ZERO,
        }
    }
}

impl LaunchConfig {
    /// Launch options for a resolved mode: headed when visual, with the
    /// mode's slow-motion delay on every page.
    #[must_use]
    pub fn from_mode(mode: &ModeConfig) -> Self {
        Self {
            headless: !mode.visual_enabled,
            slow_mo: mode.slow_mo(),
            ..Self::default()
        }
    }

    /// Show the browser window (what visual mode is for)
    #[must_use]
    pub const fn headed(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Disable the chromium sandbox
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the per-action delay
    #[must_use]
    pub const fn with_slow_mo(mut self, slow_mo: Duration) -> Self {
        self.slow_mo = slow_mo;
        self
    }

    /// Set window size
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// A launched chromium instance
#[derive(Debug)]
pub struct CdpBrowser {
    browser: Browser,
    handle: tokio::task::JoinHandle<()>,
    slow_mo: Duration,
}

impl CdpBrowser {
    /// Launch chromium
    pub async fn launch(config: LaunchConfig) -> VisualResult<Self> {
        let mut builder = BrowserConfig::builder().window_size(config.width, config.height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(VisualError::driver)?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| VisualError::driver(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handle,
            slow_mo: config.slow_mo,
        })
    }

    /// Open a blank tab paced by the launch slow-motion delay
    pub async fn new_page(&self) -> VisualResult<CdpPage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| VisualError::driver(e.to_string()))?;
        Ok(CdpPage::new(page).with_slow_mo(self.slow_mo))
    }

    /// Close the browser
    pub async fn close(mut self) -> VisualResult<()> {
        self.browser
            .close()
            .await
            .map_err(|e| VisualError::driver(e.to_string()))?;
        self.handle.abort();
        Ok(())
    }
}

/// One chromium tab
#[derive(Debug, Clone)]
pub struct CdpPage {
    page: Page,
    slow_mo: Duration,
}

impl CdpPage {
    /// Wrap a chromiumoxide page
    #[must_use]
    pub const fn new(page: Page) -> Self {
        Self {
            page,
            slow_mo: Duration::ZERO,
        }
    }

    /// Wait this long after every real input action
    #[must_use]
    pub const fn with_slow_mo(mut self, slow_mo: Duration) -> Self {
        self.slow_mo = slow_mo;
        self
    }

    /// Underlying chromiumoxide page
    #[must_use]
    pub const fn inner(&self) -> &Page {
        &self.page
    }

    async fn pace(&self) {
        if !self.slow_mo.is_zero() {
            tokio::time::sleep(self.slow_mo).await;
        }
    }

    async fn run(&self, script: &str) -> VisualResult<serde_json::Value> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(VisualError::evaluation)?;
        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| VisualError::evaluation(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Scroll the element into view and return its center
    async fn element_center(&self, locator: &Locator) -> VisualResult<Point> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return null; \
             el.scrollIntoView({{ block: 'center', inline: 'center' }}); \
             const r = el.getBoundingClientRect(); \
             return {{ x: r.x, y: r.y, width: r.width, height: r.height }}; }})()",
            locator.to_query()
        );
        let bounds: Option<BoundingBox> = serde_json::from_value(self.run(&script).await?)?;
        bounds
            .map(|b| b.center())
            .ok_or_else(|| VisualError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    async fn mouse(
        &self,
        kind: DispatchMouseEventType,
        at: Point,
        button: MouseButton,
        click_count: i64,
    ) -> VisualResult<()> {
        let params = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(at.x)
            .y(at.y)
            .button(button)
            .click_count(click_count)
            .build()
            .map_err(VisualError::input)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| VisualError::input(e.to_string()))?;
        Ok(())
    }

    async fn press(&self, at: Point, button: MouseButton, click_count: i64) -> VisualResult<()> {
        self.mouse(DispatchMouseEventType::MouseMoved, at, MouseButton::None, 0)
            .await?;
        self.mouse(
            DispatchMouseEventType::MousePressed,
            at,
            button.clone(),
            click_count,
        )
        .await?;
        self.mouse(DispatchMouseEventType::MouseReleased, at, button, click_count)
            .await
    }

    async fn key(&self, kind: DispatchKeyEventType, ch: char) -> VisualResult<()> {
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind.clone())
            .key(ch.to_string());
        if kind == DispatchKeyEventType::KeyDown {
            builder = builder.text(ch.to_string());
        }
        let params = builder.build().map_err(VisualError::input)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| VisualError::input(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for CdpPage {
    async fn navigate(&mut self, url: &str) -> VisualResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| VisualError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> VisualResult<serde_json::Value> {
        self.run(script).await
    }

    async fn add_init_script(&self, script: &str) -> VisualResult<()> {
        self.page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(script))
            .await
            .map_err(|e| VisualError::driver(e.to_string()))?;
        Ok(())
    }

    async fn bounding_box(&self, locator: &Locator) -> VisualResult<Option<BoundingBox>> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return null; \
             const r = el.getBoundingClientRect(); \
             if (r.width === 0 && r.height === 0) return null; \
             return {{ x: r.x, y: r.y, width: r.width, height: r.height }}; }})()",
            locator.to_query()
        );
        Ok(serde_json::from_value(self.run(&script).await?)?)
    }

    async fn click(&self, locator: &Locator) -> VisualResult<()> {
        let at = self.element_center(locator).await?;
        self.press(at, MouseButton::Left, 1).await?;
        self.pace().await;
        Ok(())
    }

    async fn dblclick(&self, locator: &Locator) -> VisualResult<()> {
        let at = self.element_center(locator).await?;
        self.press(at, MouseButton::Left, 1).await?;
        self.press(at, MouseButton::Left, 2).await?;
        self.pace().await;
        Ok(())
    }

    async fn right_click(&self, locator: &Locator) -> VisualResult<()> {
        let at = self.element_center(locator).await?;
        self.press(at, MouseButton::Right, 1).await?;
        self.pace().await;
        Ok(())
    }

    async fn hover(&self, locator: &Locator) -> VisualResult<()> {
        let at = self.element_center(locator).await?;
        self.mouse(DispatchMouseEventType::MouseMoved, at, MouseButton::None, 0)
            .await?;
        self.pace().await;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> VisualResult<()> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; el.focus(); \
             const v = {}; if (el.value !== v) {{ el.value = v; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); }} \
             return true; }})()",
            locator.to_query(),
            js_string(value)
        );
        if self.run(&script).await? != serde_json::Value::Bool(true) {
            return Err(VisualError::ElementNotFound {
                locator: locator.to_string(),
            });
        }
        self.pace().await;
        Ok(())
    }

    async fn press_char(&self, ch: char) -> VisualResult<()> {
        self.key(DispatchKeyEventType::KeyDown, ch).await?;
        self.key(DispatchKeyEventType::KeyUp, ch).await
    }

    async fn screenshot_jpeg(&self, quality: u8) -> VisualResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(i64::from(quality.min(100)))
            .build();
        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| VisualError::Screenshot {
                message: e.to_string(),
            })?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| VisualError::Screenshot {
                message: e.to_string(),
            })
    }
}
