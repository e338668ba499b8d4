//! Capture orchestration
//!
//! Walks a [`PreviewMap`] strictly in order: one in-page navigation per
//! descriptor, one screenshot per action state. The first failure aborts the
//! run; screenshots already written are left in place.

use super::action::{replay_action, ActionState};
use super::extractor::{discover_previews, PREVIEW_SELECTOR};
use super::filepath::screenshot_path;
use super::preview::{PreviewDescriptor, PreviewMap};
use super::progress::ProgressSink;
use crate::browser::PageDriver;
use crate::config::RunConfig;
use crate::error::{CaptureError, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Options for one capture run
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Directory receiving the screenshots; created if missing
    pub dir: PathBuf,

    /// Settle delay applied before every action replay
    pub wait: Option<Duration>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("screenshots"),
            wait: None,
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaptureReport {
    /// Descriptors processed
    pub previews: usize,

    /// Written screenshots, in capture order
    pub screenshots: Vec<PathBuf>,
}

/// Discover the previews on `config.url` and capture all of them
pub async fn run_capture<D, P>(
    driver: &D,
    config: &RunConfig,
    progress: &mut P,
) -> Result<CaptureReport>
where
    D: PageDriver,
    P: ProgressSink + ?Sized,
{
    let filter = config.preview_filter()?;
    let previews = discover_previews(
        driver,
        &config.url,
        &filter,
        &config.viewport,
        &config.navigation,
    )
    .await?;

    capture_previews(driver, &previews, &config.capture_options(), progress).await
}

/// Capture every descriptor of an already-loaded page into `options.dir`
pub async fn capture_previews<D, P>(
    driver: &D,
    previews: &PreviewMap,
    options: &CaptureOptions,
    progress: &mut P,
) -> Result<CaptureReport>
where
    D: PageDriver,
    P: ProgressSink + ?Sized,
{
    tokio::fs::create_dir_all(&options.dir).await?;

    let total = previews.descriptor_count();
    let mut report = CaptureReport::default();

    for (name, descriptors) in previews.iter() {
        log::info!("Capturing '{}' ({} preview(s))", name, descriptors.len());

        // Disambiguates filenames across all states of all descriptors sharing `name`
        let mut index = 1;
        for descriptor in descriptors {
            index = capture_descriptor(driver, descriptor, index, options, &mut report).await?;
            reset_pointer_and_focus(driver).await?;

            report.previews += 1;
            progress.update(report.previews, total);
        }
    }

    progress.finish();
    log::info!(
        "Captured {} screenshot(s) of {} preview(s) into {}",
        report.screenshots.len(),
        report.previews,
        options.dir.display()
    );

    Ok(report)
}

/// Replay every state of one descriptor; returns the next free capture index
async fn capture_descriptor<D: PageDriver>(
    driver: &D,
    descriptor: &PreviewDescriptor,
    mut index: usize,
    options: &CaptureOptions,
    report: &mut CaptureReport,
) -> Result<usize> {
    let states = ActionState::decode_list(&descriptor.name, descriptor.action_states.as_deref())?;

    navigate_in_page(driver, &descriptor.url).await?;

    for state in &states {
        let path = capture_state(driver, descriptor, index, state, options).await?;
        report.screenshots.push(path);
        index += 1;
    }

    Ok(index)
}

async fn capture_state<D: PageDriver>(
    driver: &D,
    descriptor: &PreviewDescriptor,
    index: usize,
    state: &ActionState,
    options: &CaptureOptions,
) -> Result<PathBuf> {
    let base = driver
        .query(PREVIEW_SELECTOR)
        .await?
        .ok_or_else(|| CaptureError::ElementNotFound(PREVIEW_SELECTOR.to_string()))?;

    if let Some(wait) = options.wait {
        tokio::time::sleep(wait).await;
    }

    replay_action(driver, &base, state).await?;

    let clip = match descriptor.preview_selector.as_deref() {
        Some(selector) => {
            let element = driver
                .query(selector)
                .await?
                .ok_or_else(|| CaptureError::ElementNotFound(selector.to_string()))?;
            driver.bounding_box(&element).await?
        }
        None => {
            log::warn!(
                "Preview '{}' declares no preview selector; clipping to the preview root",
                descriptor.name
            );
            driver.bounding_box(&base).await?
        }
    };

    let path = screenshot_path(&options.dir, descriptor, index, state);
    log::debug!(
        "Storing screenshot of {} in {}",
        descriptor.name,
        path.display()
    );
    driver.screenshot(&clip, &path).await?;

    Ok(path)
}

/// Same-document navigation by assigning `window.location.href`
pub async fn navigate_in_page<D: PageDriver>(driver: &D, url: &str) -> Result<()> {
    log::debug!("Navigating to hash URL {}", url);
    let quoted = serde_json::to_string(url)
        .map_err(|e| CaptureError::NavigationFailed(format!("Unencodable URL {}: {}", url, e)))?;
    driver
        .evaluate(&format!("window.location.href = {};", quoted))
        .await
        .map_err(|e| CaptureError::NavigationFailed(format!("{}: {}", url, e)))?;
    Ok(())
}

/// Blur to the document body, release the mouse button and park the pointer at the origin
pub async fn reset_pointer_and_focus<D: PageDriver>(driver: &D) -> Result<()> {
    let body = driver
        .query("body")
        .await?
        .ok_or_else(|| CaptureError::ElementNotFound("body".to_string()))?;
    driver.focus(&body).await?;
    driver.mouse_up().await?;
    driver.move_mouse(0.0, 0.0).await
}
