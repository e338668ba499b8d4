//! Preview discovery and screenshot capture

pub mod action;
pub mod extractor;
pub mod filepath;
pub mod orchestrator;
pub mod preview;
pub mod progress;

pub use action::{replay_action, resolve_target, ActionKind, ActionState};
pub use extractor::{
    discover_previews, extract_previews, PreviewFilter, POST_NAVIGATION_SETTLE, PREVIEW_SELECTOR,
};
pub use filepath::{sanitize, screenshot_label, screenshot_path};
pub use orchestrator::{
    capture_previews, navigate_in_page, reset_pointer_and_focus, run_capture, CaptureOptions,
    CaptureReport,
};
pub use preview::{PreviewDescriptor, PreviewMap};
pub use progress::{LogProgress, ProgressSink, TerminalProgress};
