//! Page driver capability set
//!
//! The capture pipeline only talks to the browser through [`PageDriver`], so any
//! automation backend exposing these operations can stand in for Chrome.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Axis-aligned box in CSS pixels, relative to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Geometric center of the box
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Options forwarded to full-page navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationOptions {
    /// Upper bound on waiting for the load event
    #[serde(with = "duration_secs")]
    pub timeout: Duration,

    /// Whether to wait for `Page.loadEventFired` at all
    pub wait_for_load: bool,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            wait_for_load: true,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Browser operations consumed by the capture pipeline.
///
/// Every operation is a suspension point; callers drive one operation at a
/// time and propagate the first error.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Handle to a DOM element on the driven page
    type Element: Send + Sync;

    /// Full-page navigation
    async fn navigate(&self, url: &str, options: &NavigationOptions) -> Result<()>;

    /// URL of the current document
    async fn current_url(&self) -> Result<String>;

    /// Serialized markup of the live DOM
    async fn content(&self) -> Result<String>;

    /// Evaluate a JavaScript expression in the page
    async fn evaluate(&self, expression: &str) -> Result<serde_json::Value>;

    /// First element matching `selector` anywhere on the page.
    ///
    /// `Ok(None)` means nothing matched; driver failures are errors.
    async fn query(&self, selector: &str) -> Result<Option<Self::Element>>;

    /// First descendant of `scope` matching `selector`
    async fn query_within(
        &self,
        scope: &Self::Element,
        selector: &str,
    ) -> Result<Option<Self::Element>>;

    async fn hover(&self, element: &Self::Element) -> Result<()>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    async fn focus(&self, element: &Self::Element) -> Result<()>;

    /// Press and release a single key
    async fn press_key(&self, key: &str) -> Result<()>;

    async fn move_mouse(&self, x: f64, y: f64) -> Result<()>;

    /// Press the primary mouse button at the current pointer position
    async fn mouse_down(&self) -> Result<()>;

    /// Release the primary mouse button at the current pointer position
    async fn mouse_up(&self) -> Result<()>;

    async fn bounding_box(&self, element: &Self::Element) -> Result<BoundingBox>;

    /// Capture a PNG clipped to `clip` and write it to `path`
    async fn screenshot(&self, clip: &BoundingBox, path: &Path) -> Result<()>;
}
