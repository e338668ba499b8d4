//! Per-run configuration

use crate::browser::NavigationOptions;
use crate::capture::{CaptureOptions, PreviewFilter};
use crate::error::{CaptureError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything one capture run needs, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Page listing the previews
    pub url: String,

    /// Output directory for screenshots
    pub dir: PathBuf,

    /// Case-insensitive name patterns; empty captures every preview.
    /// A single string is accepted as a one-pattern list.
    #[serde(deserialize_with = "one_or_many")]
    pub filter: Vec<String>,

    /// Viewport label baked into filenames; `<width>x<height>` also sizes the page
    pub viewport: String,

    /// Settle delay before each action replay, in milliseconds
    pub wait_ms: Option<u64>,

    pub navigation: NavigationOptions,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(pattern) => vec![pattern],
        OneOrMany::Many(patterns) => patterns,
    })
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            dir: PathBuf::from("screenshots"),
            filter: Vec::new(),
            viewport: "desktop".to_string(),
            wait_ms: None,
            navigation: NavigationOptions::default(),
        }
    }
}

impl RunConfig {
    /// Load a run configuration from a JSON file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| {
            CaptureError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Basic checks before any browser work
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(CaptureError::Config("A page URL is required".to_string()));
        }
        if self.viewport.trim().is_empty() {
            return Err(CaptureError::Config("Viewport label cannot be empty".to_string()));
        }
        self.preview_filter()?;
        Ok(())
    }

    pub fn preview_filter(&self) -> Result<PreviewFilter> {
        PreviewFilter::new(self.filter.as_slice())
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            dir: self.dir.clone(),
            wait: self
                .wait_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
        }
    }

    /// Pixel size encoded in the viewport label, e.g. `1024x768`
    pub fn viewport_size(&self) -> Option<(u32, u32)> {
        let (width, height) = self.viewport.trim().split_once(|c: char| c == 'x' || c == 'X')?;
        let width = width.trim().parse().ok()?;
        let height = height.trim().parse().ok()?;
        (width > 0 && height > 0).then_some((width, height))
    }
}
