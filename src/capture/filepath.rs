//! Deterministic screenshot paths
//!
//! Identical inputs always produce the identical path, so repeated runs
//! overwrite earlier captures instead of accumulating stale files.

use super::action::{ActionKind, ActionState};
use super::preview::PreviewDescriptor;
use std::path::{Path, PathBuf};

/// Suffix marking a freshly captured screenshot
pub const SCREENSHOT_SUFFIX: &str = ".new.png";

/// Raw, lower-cased label: `name description action key viewport`.
///
/// The description falls back to `index` when the preview declares none; the
/// action is left empty for `none`.
pub fn screenshot_label(descriptor: &PreviewDescriptor, index: usize, state: &ActionState) -> String {
    let description = descriptor
        .description
        .clone()
        .unwrap_or_else(|| index.to_string());
    let action = match state.action {
        ActionKind::None => "",
        other => other.as_str(),
    };
    let key = state.key.as_deref().unwrap_or("");

    format!(
        "{} {} {} {} {}",
        descriptor.name, description, action, key, descriptor.viewport
    )
    .to_lowercase()
}

/// Replace every run of characters outside `[0-9A-Za-z]` with one underscore
pub fn sanitize(label: &str) -> String {
    let mut sanitized = String::with_capacity(label.len());
    let mut in_run = false;
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            sanitized.push(c);
            in_run = false;
        } else if !in_run {
            sanitized.push('_');
            in_run = true;
        }
    }
    sanitized
}

/// `<dir>/<sanitized label>.new.png`
pub fn screenshot_path(
    dir: &Path,
    descriptor: &PreviewDescriptor,
    index: usize,
    state: &ActionState,
) -> PathBuf {
    let file_name = format!(
        "{}{}",
        sanitize(&screenshot_label(descriptor, index, state)),
        SCREENSHOT_SUFFIX
    );
    dir.join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> PreviewDescriptor {
        PreviewDescriptor {
            name: "card".to_string(),
            url: "http://localhost/p#card".to_string(),
            description: None,
            action_states: None,
            preview_selector: None,
            viewport: "desktop".to_string(),
        }
    }

    #[test]
    fn test_sanitize_collapses_runs() {
        assert_eq!(
            sanitize("nav bar: primary!! click  320x480"),
            "nav_bar_primary_click_320x480"
        );
        assert_eq!(sanitize("a--b"), "a_b");
        assert_eq!(sanitize("ünïcode"), "_n_code");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_label_is_lower_cased() {
        let mut d = card();
        d.name = "Nav Bar".to_string();
        d.description = Some("Primary!!".to_string());
        d.viewport = "320x480".to_string();
        let state = ActionState::new(ActionKind::Click);

        let path = screenshot_path(Path::new("out"), &d, 7, &state);
        assert_eq!(path, Path::new("out").join("nav_bar_primary_click_320x480.new.png"));
    }

    #[test]
    fn test_description_defaults_to_index() {
        let hover = ActionState::new(ActionKind::Hover);
        let click = ActionState::new(ActionKind::Click);

        assert_eq!(
            screenshot_path(Path::new("shots"), &card(), 1, &hover),
            Path::new("shots").join("card_1_hover_desktop.new.png")
        );
        assert_eq!(
            screenshot_path(Path::new("shots"), &card(), 2, &click),
            Path::new("shots").join("card_2_click_desktop.new.png")
        );
    }

    #[test]
    fn test_none_action_is_omitted() {
        let state = ActionState::default();
        assert_eq!(screenshot_label(&card(), 3, &state), "card 3   desktop");
        assert_eq!(
            screenshot_path(Path::new("d"), &card(), 3, &state),
            Path::new("d").join("card_3_desktop.new.png")
        );
    }

    #[test]
    fn test_key_is_included() {
        let mut state = ActionState::new(ActionKind::KeyPress);
        state.key = Some("Enter".to_string());
        assert_eq!(
            screenshot_path(Path::new("d"), &card(), 1, &state),
            Path::new("d").join("card_1_keypress_enter_desktop.new.png")
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let mut d = card();
        d.description = Some("With Icon".to_string());
        let mut state = ActionState::new(ActionKind::MouseDown);
        state.selector = Some(".icon".to_string());
        state.wait = Some(100.0);

        let first = screenshot_path(Path::new("out"), &d, 4, &state);
        let second = screenshot_path(Path::new("out"), &d.clone(), 4, &state.clone());
        assert_eq!(first, second);
        assert_eq!(
            first,
            Path::new("out").join("card_with_icon_mousedown_desktop.new.png")
        );
    }

    #[test]
    fn test_description_overrides_index() {
        let mut d = card();
        d.description = Some("dark".to_string());
        let state = ActionState::default();
        assert_eq!(
            screenshot_path(Path::new("o"), &d, 1, &state),
            screenshot_path(Path::new("o"), &d, 9, &state)
        );
    }
}
