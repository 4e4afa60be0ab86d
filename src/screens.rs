//! UI-agnostic state for the scan and generate screens
//!
//! A UI layer owns one of each, forwards user events to them and renders
//! what they expose. Nothing here draws, prompts for permissions or talks
//! to platform intents.

use crate::encoder::Encoder;
use crate::error::Result;
use crate::gate::ResultGate;
use crate::models::EncodeRequest;
use crate::share::{ShareHandle, export_png};
use image::GrayImage;
use std::fmt;
use std::path::Path;
use std::sync::mpsc::Receiver;
use tracing::debug;

/// Camera controls the scan screen can drive
pub trait CameraControl {
    /// Turn the torch on or off
    fn enable_torch(&self, on: bool);
}

/// One-shot message shown when a new code is detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The detected value
    pub code: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Detected: {}", self.code)
    }
}

/// What the "Open/Share" button does with the current result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultAction {
    /// Hand the value to a viewer (browser, dialer, mail client, maps)
    Open(String),
    /// Share the value as plain text
    ShareText(String),
}

/// URI schemes that platforms reliably have a viewer for
const VIEWABLE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel", "sms", "smsto", "geo"];

impl ResultAction {
    /// Pick the action for a decoded value
    pub fn for_content(content: &str) -> Self {
        match uri_scheme(content) {
            Some(scheme) if VIEWABLE_SCHEMES.iter().any(|s| scheme.eq_ignore_ascii_case(s)) => {
                ResultAction::Open(content.to_owned())
            }
            _ => ResultAction::ShareText(content.to_owned()),
        }
    }
}

/// RFC 3986 scheme prefix, if `s` starts with one followed by more content
fn uri_scheme(s: &str) -> Option<&str> {
    let (scheme, rest) = s.trim().split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() || rest.is_empty() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

/// Scan screen state: duplicate gate, torch and camera handle
#[derive(Default)]
pub struct ScannerScreen {
    gate: ResultGate,
    torch_on: bool,
    camera: Option<Box<dyn CameraControl>>,
}

impl ScannerScreen {
    /// New screen with no result and the torch off
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the camera control once the camera is bound
    pub fn attach_camera(&mut self, camera: Box<dyn CameraControl>) {
        camera.enable_torch(self.torch_on);
        self.camera = Some(camera);
    }

    /// Handle a decoded value; returns a notification if it is new
    pub fn on_decoded(&mut self, code: &str) -> Option<Notification> {
        if code.is_empty() || !self.gate.offer(code) {
            return None;
        }
        debug!("new scan result, {} chars", code.len());
        Some(Notification { code: code.to_owned() })
    }

    /// Drain every result the scan session has delivered so far
    pub fn drain(&mut self, results: &Receiver<String>) -> Vec<Notification> {
        results.try_iter().filter_map(|code| self.on_decoded(&code)).collect()
    }

    /// Result currently shown in the result sheet
    pub fn current_result(&self) -> Option<&str> {
        self.gate.current()
    }

    /// "Scan Again": hide the result so the same code can be detected again
    pub fn dismiss(&mut self) {
        self.gate.dismiss();
    }

    /// Action for the current result, if one is shown
    pub fn result_action(&self) -> Option<ResultAction> {
        self.gate.current().map(ResultAction::for_content)
    }

    /// Flip the torch and forward the new state to the camera, if attached.
    /// Returns the new state.
    pub fn toggle_torch(&mut self) -> bool {
        self.torch_on = !self.torch_on;
        if let Some(camera) = &self.camera {
            camera.enable_torch(self.torch_on);
        }
        self.torch_on
    }

    /// Whether the torch is on
    pub fn torch_on(&self) -> bool {
        self.torch_on
    }
}

/// Generate screen state: input text and the last generated image
#[derive(Debug, Default)]
pub struct GeneratorScreen {
    input: String,
    image: Option<GrayImage>,
    encoder: Encoder,
}

impl GeneratorScreen {
    /// New screen using the given encoder
    pub fn new(encoder: Encoder) -> Self {
        Self {
            input: String::new(),
            image: None,
            encoder,
        }
    }

    /// Replace the input text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Current input text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// "Generate": encode the input at the configured size.
    ///
    /// Empty input is ignored and keeps the previous image. An encode
    /// failure clears the image. Returns whether an image is now shown
    /// for the current input.
    pub fn generate(&mut self) -> bool {
        let Ok(request) = EncodeRequest::new(self.input.as_str(), self.encoder.config().size) else {
            return false;
        };
        self.image = self.encoder.encode(&request);
        self.image.is_some()
    }

    /// Last generated image
    pub fn image(&self) -> Option<&GrayImage> {
        self.image.as_ref()
    }

    /// "Share QR": export the current image under `cache_dir`.
    ///
    /// `Ok(None)` when there is nothing to share.
    pub fn share(&self, cache_dir: &Path) -> Result<Option<ShareHandle>> {
        match &self.image {
            Some(img) => export_png(img, cache_dir).map(Some),
            None => Ok(None),
        }
    }
}
