// spider_chrome re-exports chromiumoxide API
use super::driver::{BoundingBox, NavigationOptions, PageDriver};
use crate::error::{CaptureError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventLoadEventFired, NavigateParams, Viewport,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const INSTALL_HINT: &str = "Chrome not found. You can:\n\
     - Install Chrome: https://www.google.com/chrome/\n\
     - Ubuntu/Debian: sudo apt install chromium-browser\n\
     - Fedora: sudo dnf install chromium\n\
     - macOS: brew install --cask google-chrome\n\
     - Or specify path: --chrome-path /path/to/chrome\n\
     - Linux sandbox issue? Try: --no-sandbox";

/// Text a key inserts when pressed; most named keys insert nothing
fn key_text(key: &str) -> Option<String> {
    match key {
        "Enter" => Some("\r".to_string()),
        _ if key.chars().count() == 1 => Some(key.to_string()),
        _ => None,
    }
}

/// Owns the browser process (or debug-port connection) for one run
pub struct ChromeDriver {
    browser: Browser,
    temp_dir: Option<PathBuf>,
}

/// Connection mode for Chrome browser
pub enum ConnectionMode {
    /// Launches Chrome using the system installation or an explicit binary
    Sandboxed {
        chrome_path: Option<String>,
        no_sandbox: bool,
        headless: bool,
    },
    /// Connects to an existing Chrome on a debug port
    DebugPort(u16),
}

impl ChromeDriver {
    /// Create new ChromeDriver with specified connection mode
    pub async fn new(mode: ConnectionMode) -> Result<Self> {
        let (browser, temp_dir) = match mode {
            ConnectionMode::Sandboxed {
                chrome_path,
                no_sandbox,
                headless,
            } => {
                // Unique profile directory so concurrent launches never share state
                let unique_id = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos();
                let temp_dir =
                    std::env::temp_dir().join(format!("preview-shots-chrome-{}", unique_id));
                std::fs::create_dir_all(&temp_dir).map_err(|e| {
                    CaptureError::LaunchFailed(format!("Failed to create temp directory: {}", e))
                })?;

                let mut config = if headless {
                    BrowserConfig::builder()
                } else {
                    BrowserConfig::builder().with_head()
                };

                config = config.user_data_dir(&temp_dir);

                if no_sandbox {
                    config = config.arg("--no-sandbox");
                }

                if let Some(path) = chrome_path {
                    config = config.chrome_executable(path);
                }

                let config = config
                    .build()
                    .map_err(|e| CaptureError::LaunchFailed(format!("{}. \n\n{}", e, INSTALL_HINT)))?;

                log::info!("Launching Chrome (headless: {})", headless);
                let (browser, mut handler) = Browser::launch(config)
                    .await
                    .map_err(|e| CaptureError::LaunchFailed(format!("{}. \n\n{}", e, INSTALL_HINT)))?;

                tokio::spawn(async move {
                    while (handler.next().await).is_some() {
                        // Drain browser events
                    }
                });

                (browser, Some(temp_dir))
            }
            ConnectionMode::DebugPort(port) => {
                let url = format!("http://localhost:{}", port);
                log::info!("Connecting to Chrome at {}", url);
                let (browser, mut handler) = Browser::connect(&url).await.map_err(|e| {
                    CaptureError::ConnectionFailed(format!(
                        "Failed to connect to Chrome on port {}. \
                             Make sure Chrome is running with --remote-debugging-port={}: {}",
                        port, port, e
                    ))
                })?;

                tokio::spawn(async move {
                    while (handler.next().await).is_some() {
                        // Drain browser events
                    }
                });

                (browser, None)
            }
        };

        Ok(Self { browser, temp_dir })
    }

    /// Page to drive, preferring the first non-`chrome://` tab and creating one if none exist
    pub async fn open_page(&self) -> Result<ChromePage> {
        let pages = self.browser.pages().await?;

        for page in pages.iter() {
            if let Ok(Some(url)) = page.url().await {
                if !url.starts_with("chrome://") {
                    return Ok(ChromePage::new(page.clone()));
                }
            }
        }

        if let Some(page) = pages.last() {
            return Ok(ChromePage::new(page.clone()));
        }

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| CaptureError::Other(format!("Failed to create page: {}", e)))?;
        Ok(ChromePage::new(page))
    }

    /// Close the browser connection
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| CaptureError::Other(e.to_string()))?;
        Ok(())
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        if let Some(temp_dir) = &self.temp_dir {
            if temp_dir.exists() {
                let _ = std::fs::remove_dir_all(temp_dir);
            }
        }
    }
}

/// A live CDP page driven through [`PageDriver`]
pub struct ChromePage {
    page: Page,
    pointer: Mutex<(f64, f64)>,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            pointer: Mutex::new((0.0, 0.0)),
        }
    }

    /// Underlying chromiumoxide page for advanced CDP usage
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Emulate a device viewport of `width` x `height` CSS pixels
    pub async fn set_viewport_size(&self, width: u32, height: u32) -> Result<()> {
        let params = SetDeviceMetricsOverrideParams::new(width as i64, height as i64, 1.0, false);
        self.page.execute(params).await.map_err(|e| {
            CaptureError::Other(format!("Failed to set viewport {}x{}: {}", width, height, e))
        })?;
        log::debug!("Viewport set to {}x{}", width, height);
        Ok(())
    }

    async fn dispatch_mouse(&self, kind: DispatchMouseEventType, x: f64, y: f64) -> Result<()> {
        let mut builder = DispatchMouseEventParams::builder().r#type(kind.clone()).x(x).y(y);
        if kind != DispatchMouseEventType::MouseMoved {
            builder = builder.button(MouseButton::Left).click_count(1);
        }
        let params = builder
            .build()
            .map_err(|e| CaptureError::Other(format!("Invalid mouse event: {}", e)))?;
        self.page.execute(params).await?;
        Ok(())
    }

    async fn dispatch_key(&self, kind: DispatchKeyEventType, key: &str) -> Result<()> {
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind.clone())
            .key(key.to_string());
        if kind == DispatchKeyEventType::KeyDown {
            if let Some(text) = key_text(key) {
                builder = builder.text(text);
            }
        }
        let params = builder
            .build()
            .map_err(|e| CaptureError::Other(format!("Invalid key event: {}", e)))?;
        self.page.execute(params).await?;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for ChromePage {
    type Element = Element;

    async fn navigate(&self, url: &str, options: &NavigationOptions) -> Result<()> {
        log::info!("Navigating to {}", url);

        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| CaptureError::NavigationFailed(format!("Invalid URL {}: {}", url, e)))?;

        // Subscribe before navigating so the load event cannot be missed
        let mut load_events = self.page.event_listener::<EventLoadEventFired>().await?;

        let response = self.page.execute(params).await.map_err(|e| {
            let error_str = e.to_string();
            if error_str.contains("oneshot canceled") {
                CaptureError::NavigationFailed(
                    "Browser connection lost. The browser may have been closed or crashed."
                        .to_string(),
                )
            } else {
                CaptureError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e))
            }
        })?;

        if let Some(error_text) = &response.result.error_text {
            return Err(CaptureError::NavigationFailed(format!(
                "Navigation to {} failed: {}",
                url, error_text
            )));
        }

        if options.wait_for_load {
            match tokio::time::timeout(options.timeout, load_events.next()).await {
                Ok(Some(_)) => log::debug!("Load event fired for {}", url),
                Ok(None) => log::warn!("Load event stream closed before {} finished", url),
                Err(_) => {
                    return Err(CaptureError::NavigationFailed(format!(
                        "Timed out after {:?} waiting for {} to load",
                        options.timeout, url
                    )));
                }
            }
        }

        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.page
            .url()
            .await
            .map_err(|e| CaptureError::Other(e.to_string()))?
            .ok_or(CaptureError::NoPage)
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| CaptureError::Other(format!("Failed to read page content: {}", e)))
    }

    async fn evaluate(&self, expression: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|e| CaptureError::Other(format!("Script execution failed: {}", e)))?;

        Ok(result.into_value().unwrap_or(serde_json::Value::Null))
    }

    async fn query(&self, selector: &str) -> Result<Option<Element>> {
        // An empty match list is "not found"; CDP failures propagate
        let elements = self.page.find_elements(selector).await?;
        Ok(elements.into_iter().next())
    }

    async fn query_within(&self, scope: &Element, selector: &str) -> Result<Option<Element>> {
        let elements = scope.find_elements(selector).await?;
        Ok(elements.into_iter().next())
    }

    async fn hover(&self, element: &Element) -> Result<()> {
        element.hover().await?;
        if let Ok(bbox) = element.bounding_box().await {
            *self.pointer.lock().await = (bbox.x + bbox.width / 2.0, bbox.y + bbox.height / 2.0);
        }
        Ok(())
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await?;
        if let Ok(bbox) = element.bounding_box().await {
            *self.pointer.lock().await = (bbox.x + bbox.width / 2.0, bbox.y + bbox.height / 2.0);
        }
        Ok(())
    }

    async fn focus(&self, element: &Element) -> Result<()> {
        element.focus().await?;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.dispatch_key(DispatchKeyEventType::KeyDown, key).await?;
        self.dispatch_key(DispatchKeyEventType::KeyUp, key).await
    }

    async fn move_mouse(&self, x: f64, y: f64) -> Result<()> {
        self.dispatch_mouse(DispatchMouseEventType::MouseMoved, x, y)
            .await?;
        *self.pointer.lock().await = (x, y);
        Ok(())
    }

    async fn mouse_down(&self) -> Result<()> {
        let (x, y) = *self.pointer.lock().await;
        self.dispatch_mouse(DispatchMouseEventType::MousePressed, x, y)
            .await
    }

    async fn mouse_up(&self) -> Result<()> {
        let (x, y) = *self.pointer.lock().await;
        self.dispatch_mouse(DispatchMouseEventType::MouseReleased, x, y)
            .await
    }

    async fn bounding_box(&self, element: &Element) -> Result<BoundingBox> {
        let bbox = element
            .bounding_box()
            .await
            .map_err(|e| CaptureError::CaptureFailed(format!("No bounding box: {}", e)))?;
        Ok(BoundingBox::new(bbox.x, bbox.y, bbox.width, bbox.height))
    }

    async fn screenshot(&self, clip: &BoundingBox, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .clip(Viewport {
                x: clip.x,
                y: clip.y,
                width: clip.width,
                height: clip.height,
                scale: 1.0,
            })
            .build();

        let data = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::CaptureFailed(format!("Failed to take screenshot: {}", e)))?;

        tokio::fs::write(path, data).await.map_err(|e| {
            CaptureError::CaptureFailed(format!("Failed to write {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}
