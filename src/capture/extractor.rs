//! Preview discovery
//!
//! Scans rendered page markup for elements carrying `data-preview` and groups
//! them into a [`PreviewMap`].

use super::preview::{PreviewDescriptor, PreviewMap};
use crate::browser::{NavigationOptions, PageDriver};
use crate::error::{CaptureError, Result};
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Marker attribute selecting preview elements
pub const PREVIEW_SELECTOR: &str = "[data-preview]";

/// Link in the sibling subtree that names the preview's own URL
const LINK_SELECTOR: &str = "a[href][title]";

/// Fixed delay after a full-page navigation before the DOM is read
pub const POST_NAVIGATION_SETTLE: Duration = Duration::from_secs(5);

/// Case-insensitive name filter; a name passes when any pattern matches it
#[derive(Debug, Clone, Default)]
pub struct PreviewFilter {
    patterns: Vec<Regex>,
}

impl PreviewFilter {
    /// Filter that accepts every name
    pub fn all() -> Self {
        Self::default()
    }

    /// Compile patterns as case-insensitive regexes. No patterns means no filtering.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| CaptureError::InvalidFilter {
                        pattern: pattern.as_ref().to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_all(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.is_all() || self.patterns.iter().any(|re| re.is_match(name))
    }
}

/// Extract previews from `html`, resolving links against `page_url`.
///
/// A marked element without a linked sibling aborts the whole extraction,
/// whether or not its name passes the filter.
pub fn extract_previews(
    html: &str,
    page_url: &str,
    filter: &PreviewFilter,
    viewport: &str,
) -> Result<PreviewMap> {
    let base = Url::parse(page_url).map_err(|e| {
        CaptureError::ExtractionFailed(format!("Invalid page URL '{}': {}", page_url, e))
    })?;
    let document = Html::parse_document(html);
    let preview_sel = parse_selector(PREVIEW_SELECTOR)?;
    let link_sel = parse_selector(LINK_SELECTOR)?;

    let mut previews = PreviewMap::new();

    for element in document.select(&preview_sel) {
        let attrs = element.value();
        let name = attrs.attr("data-preview").unwrap_or_default().to_string();
        let url = resolve_link(&element, &link_sel, &base, &name)?;

        log::debug!("Preview element data: {}", dataset_json(&element));

        if !filter.matches(&name) {
            continue;
        }

        previews.insert(PreviewDescriptor {
            name,
            url,
            description: attrs.attr("data-description").map(str::to_string),
            action_states: attrs.attr("data-action-states").map(str::to_string),
            preview_selector: attrs.attr("data-preview-selector").map(str::to_string),
            viewport: viewport.to_string(),
        });
    }

    log::info!(
        "Discovered {} preview(s) under {} name(s)",
        previews.descriptor_count(),
        previews.len()
    );

    Ok(previews)
}

/// Load `url`, let it settle, then extract its previews
pub async fn discover_previews<D: PageDriver>(
    driver: &D,
    url: &str,
    filter: &PreviewFilter,
    viewport: &str,
    navigation: &NavigationOptions,
) -> Result<PreviewMap> {
    driver.navigate(url, navigation).await?;
    tokio::time::sleep(POST_NAVIGATION_SETTLE).await;

    let html = driver.content().await?;
    let page_url = driver.current_url().await?;
    extract_previews(&html, &page_url, filter, viewport)
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| CaptureError::Other(format!("Invalid selector '{}': {:?}", selector, e)))
}

fn resolve_link(
    element: &ElementRef<'_>,
    link_sel: &Selector,
    base: &Url,
    name: &str,
) -> Result<String> {
    let href = element
        .next_siblings()
        .find_map(ElementRef::wrap)
        .and_then(|sibling| sibling.select(link_sel).next())
        .and_then(|link| link.value().attr("href"))
        .ok_or_else(|| {
            CaptureError::ExtractionFailed(format!(
                "Preview '{}' has no sibling link matching {}",
                name, LINK_SELECTOR
            ))
        })?;

    base.join(href).map(String::from).map_err(|e| {
        CaptureError::ExtractionFailed(format!(
            "Preview '{}' has an unresolvable link '{}': {}",
            name, href, e
        ))
    })
}

fn dataset_json(element: &ElementRef<'_>) -> String {
    let dataset: BTreeMap<&str, &str> = element
        .value()
        .attrs()
        .filter_map(|(attr, value)| attr.strip_prefix("data-").map(|key| (key, value)))
        .collect();
    serde_json::to_string_pretty(&dataset).unwrap_or_default()
}
