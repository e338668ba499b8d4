pub mod browser;
pub mod capture;
pub mod config;
pub mod error;

//  Re-export commonly used items
pub use browser::{BoundingBox, ChromeDriver, ChromePage, ConnectionMode, NavigationOptions, PageDriver};
pub use capture::{
    capture_previews, discover_previews, extract_previews, run_capture, ActionKind, ActionState,
    CaptureOptions, CaptureReport, PreviewDescriptor, PreviewFilter, PreviewMap, ProgressSink,
};
pub use config::RunConfig;
pub use error::{CaptureError, Result};
