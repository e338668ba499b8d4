//! Interaction states and their replay against a page driver

use crate::browser::PageDriver;
use crate::error::{CaptureError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key pressed by `keyPress` when the state declares none
pub const DEFAULT_KEY: &str = "a";

/// The closed set of interactions a preview can declare
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    #[default]
    None,
    Hover,
    Click,
    MouseDown,
    Focus,
    KeyPress,
}

impl ActionKind {
    /// Name as written in `data-action-states`
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::None => "none",
            ActionKind::Hover => "hover",
            ActionKind::Click => "click",
            ActionKind::MouseDown => "mouseDown",
            ActionKind::Focus => "focus",
            ActionKind::KeyPress => "keyPress",
        }
    }
}

/// One visual state to capture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionState {
    #[serde(default)]
    pub action: ActionKind,

    /// Interaction target; the preview root when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Settle delay after the action, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<f64>,
}

impl ActionState {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            ..Default::default()
        }
    }

    /// Decode a preview's serialized state list.
    ///
    /// Absent and empty lists both become a single `none` state so every
    /// descriptor yields at least one capture.
    pub fn decode_list(preview_name: &str, raw: Option<&str>) -> Result<Vec<ActionState>> {
        let states: Vec<ActionState> = match raw.map(str::trim) {
            None | Some("") => Vec::new(),
            Some(raw) => serde_json::from_str(raw).map_err(|source| {
                CaptureError::InvalidActionStates {
                    name: preview_name.to_string(),
                    source,
                }
            })?,
        };

        if let Some(ms) = states.iter().find_map(ActionState::unrepresentable_wait) {
            return Err(CaptureError::InvalidActionStates {
                name: preview_name.to_string(),
                source: serde::de::Error::custom(format!("wait of {} ms is out of range", ms)),
            });
        }

        if states.is_empty() {
            Ok(vec![ActionState::default()])
        } else {
            Ok(states)
        }
    }

    /// Declared settle delay; missing, negative or non-finite values mean none
    pub fn settle_delay(&self) -> Option<Duration> {
        self.wait
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok())
    }

    /// A positive, finite wait too large to express as a `Duration`
    fn unrepresentable_wait(&self) -> Option<f64> {
        self.wait.filter(|ms| {
            ms.is_finite() && *ms > 0.0 && Duration::try_from_secs_f64(ms / 1000.0).is_err()
        })
    }
}

/// Resolve the element a declared selector targets.
///
/// The selector is searched inside the preview first, then page-wide.
/// `Ok(None)` means no selector was declared and the preview root is the target.
pub async fn resolve_target<D: PageDriver>(
    driver: &D,
    base: &D::Element,
    selector: Option<&str>,
) -> Result<Option<D::Element>> {
    let Some(selector) = selector else {
        return Ok(None);
    };

    if let Some(element) = driver.query_within(base, selector).await? {
        return Ok(Some(element));
    }

    driver
        .query(selector)
        .await?
        .map(Some)
        .ok_or_else(|| CaptureError::ElementNotFound(selector.to_string()))
}

/// Perform exactly one interaction for `state`, then wait its settle delay.
///
/// `mouseDown` leaves the button pressed; the orchestrator releases it once
/// the descriptor's states are done.
pub async fn replay_action<D: PageDriver>(
    driver: &D,
    base: &D::Element,
    state: &ActionState,
) -> Result<()> {
    let resolved = resolve_target(driver, base, state.selector.as_deref()).await?;
    let target = resolved.as_ref().unwrap_or(base);

    match state.action {
        ActionKind::None => {}
        ActionKind::Hover => driver.hover(target).await?,
        ActionKind::Click => driver.click(target).await?,
        ActionKind::MouseDown => {
            let (x, y) = driver.bounding_box(target).await?.center();
            driver.move_mouse(x, y).await?;
            driver.mouse_down().await?;
        }
        ActionKind::Focus => driver.focus(target).await?,
        ActionKind::KeyPress => {
            let key = state
                .key
                .as_deref()
                .filter(|key| !key.is_empty())
                .unwrap_or(DEFAULT_KEY);
            driver.press_key(key).await?;
        }
    }

    if let Some(delay) = state.settle_delay() {
        tokio::time::sleep(delay).await;
    }

    Ok(())
}
