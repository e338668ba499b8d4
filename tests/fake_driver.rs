//! Recording in-memory page driver for tests
//!
//! Models just enough of a page to exercise the capture pipeline: a set of
//! selectable elements with bounding boxes, pointer/button/focus state, and a
//! log of every driver call in order.

#![allow(dead_code)]

use async_trait::async_trait;
use preview_shots::{BoundingBox, CaptureError, NavigationOptions, PageDriver, ProgressSink};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Navigate(String),
    Evaluate(String),
    Hover(String),
    Click(String),
    Focus(String),
    PressKey(String),
    MoveMouse(f64, f64),
    MouseDown,
    MouseUp,
    Screenshot(PathBuf, BoundingBox),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeElement {
    pub id: String,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    mouse_pressed: bool,
    pressed_while_down: usize,
    focused: Option<String>,
    pointer: (f64, f64),
    screenshots: usize,
}

pub struct FakeDriver {
    html: String,
    url: String,
    boxes: HashMap<String, BoundingBox>,
    scoped: HashMap<(String, String), String>,
    fail_screenshot_at: Option<usize>,
    fail_evaluate: bool,
    fail_queries: bool,
    fail_scoped_queries: bool,
    state: Mutex<State>,
}

pub const PREVIEW_BOX: BoundingBox = BoundingBox {
    x: 10.0,
    y: 20.0,
    width: 200.0,
    height: 100.0,
};

impl FakeDriver {
    /// A page with a single `[data-preview]` root and a `body`
    pub fn new() -> Self {
        let mut boxes = HashMap::new();
        boxes.insert("[data-preview]".to_string(), PREVIEW_BOX);
        boxes.insert(
            "body".to_string(),
            BoundingBox::new(0.0, 0.0, 800.0, 600.0),
        );
        Self {
            html: String::new(),
            url: "about:blank".to_string(),
            boxes,
            scoped: HashMap::new(),
            fail_screenshot_at: None,
            fail_evaluate: false,
            fail_queries: false,
            fail_scoped_queries: false,
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_page(mut self, html: &str, url: &str) -> Self {
        self.html = html.to_string();
        self.url = url.to_string();
        self
    }

    /// Element reachable by `selector` page-wide
    pub fn with_element(mut self, selector: &str, bbox: BoundingBox) -> Self {
        self.boxes.insert(selector.to_string(), bbox);
        self
    }

    /// Element reachable by `selector` inside the preview root only
    pub fn with_scoped_element(mut self, selector: &str, id: &str, bbox: BoundingBox) -> Self {
        self.scoped.insert(
            ("[data-preview]".to_string(), selector.to_string()),
            id.to_string(),
        );
        self.boxes.insert(id.to_string(), bbox);
        self
    }

    /// Make the n-th screenshot (1-based) fail
    pub fn fail_screenshot_at(mut self, n: usize) -> Self {
        self.fail_screenshot_at = Some(n);
        self
    }

    pub fn fail_evaluate(mut self) -> Self {
        self.fail_evaluate = true;
        self
    }

    /// Every element lookup fails as if the tab had crashed
    pub fn fail_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Lookups inside an element fail; page-wide lookups still work
    pub fn fail_scoped_queries(mut self) -> Self {
        self.fail_scoped_queries = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn screenshot_paths(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Screenshot(path, _) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn mouse_pressed(&self) -> bool {
        self.state.lock().unwrap().mouse_pressed
    }

    /// Presses issued while the button was already held
    pub fn pressed_while_down(&self) -> usize {
        self.state.lock().unwrap().pressed_while_down
    }

    pub fn focused(&self) -> Option<String> {
        self.state.lock().unwrap().focused.clone()
    }

    pub fn pointer(&self) -> (f64, f64) {
        self.state.lock().unwrap().pointer
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    type Element = FakeElement;

    async fn navigate(&self, url: &str, _options: &NavigationOptions) -> preview_shots::Result<()> {
        self.record(Call::Navigate(url.to_string()));
        Ok(())
    }

    async fn current_url(&self) -> preview_shots::Result<String> {
        Ok(self.url.clone())
    }

    async fn content(&self) -> preview_shots::Result<String> {
        Ok(self.html.clone())
    }

    async fn evaluate(&self, expression: &str) -> preview_shots::Result<serde_json::Value> {
        self.record(Call::Evaluate(expression.to_string()));
        if self.fail_evaluate {
            return Err(CaptureError::Other("page crashed".to_string()));
        }
        Ok(serde_json::Value::Null)
    }

    async fn query(&self, selector: &str) -> preview_shots::Result<Option<FakeElement>> {
        if self.fail_queries {
            return Err(CaptureError::Other("target closed".to_string()));
        }
        Ok(self.boxes.contains_key(selector).then(|| FakeElement {
            id: selector.to_string(),
        }))
    }

    async fn query_within(
        &self,
        scope: &FakeElement,
        selector: &str,
    ) -> preview_shots::Result<Option<FakeElement>> {
        if self.fail_scoped_queries {
            return Err(CaptureError::Other("target closed".to_string()));
        }
        Ok(self
            .scoped
            .get(&(scope.id.clone(), selector.to_string()))
            .map(|id| FakeElement { id: id.clone() }))
    }

    async fn hover(&self, element: &FakeElement) -> preview_shots::Result<()> {
        self.record(Call::Hover(element.id.clone()));
        Ok(())
    }

    async fn click(&self, element: &FakeElement) -> preview_shots::Result<()> {
        self.record(Call::Click(element.id.clone()));
        Ok(())
    }

    async fn focus(&self, element: &FakeElement) -> preview_shots::Result<()> {
        self.record(Call::Focus(element.id.clone()));
        self.state.lock().unwrap().focused = Some(element.id.clone());
        Ok(())
    }

    async fn press_key(&self, key: &str) -> preview_shots::Result<()> {
        self.record(Call::PressKey(key.to_string()));
        Ok(())
    }

    async fn move_mouse(&self, x: f64, y: f64) -> preview_shots::Result<()> {
        self.record(Call::MoveMouse(x, y));
        self.state.lock().unwrap().pointer = (x, y);
        Ok(())
    }

    async fn mouse_down(&self) -> preview_shots::Result<()> {
        self.record(Call::MouseDown);
        let mut state = self.state.lock().unwrap();
        if state.mouse_pressed {
            state.pressed_while_down += 1;
        }
        state.mouse_pressed = true;
        Ok(())
    }

    async fn mouse_up(&self) -> preview_shots::Result<()> {
        self.record(Call::MouseUp);
        self.state.lock().unwrap().mouse_pressed = false;
        Ok(())
    }

    async fn bounding_box(&self, element: &FakeElement) -> preview_shots::Result<BoundingBox> {
        self.boxes
            .get(&element.id)
            .copied()
            .ok_or_else(|| CaptureError::CaptureFailed(format!("no box for {}", element.id)))
    }

    async fn screenshot(&self, clip: &BoundingBox, path: &Path) -> preview_shots::Result<()> {
        let n = {
            let mut state = self.state.lock().unwrap();
            state.screenshots += 1;
            state.screenshots
        };
        if self.fail_screenshot_at == Some(n) {
            return Err(CaptureError::CaptureFailed(format!(
                "screenshot {} refused",
                n
            )));
        }
        self.record(Call::Screenshot(path.to_path_buf(), *clip));
        tokio::fs::write(path, b"\x89PNG fake").await?;
        Ok(())
    }
}

/// Progress sink remembering every update
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub updates: Vec<(usize, usize)>,
    pub finished: bool,
}

impl ProgressSink for RecordingProgress {
    fn update(&mut self, current: usize, total: usize) {
        self.updates.push((current, total));
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
