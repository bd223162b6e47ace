//! Screenshot frame buffer.
//!
//! Frames carry no sequence number: the content is the marker. A frame equal
//! to the last accepted one is dropped. Accepted frames feed a rolling
//! frames-per-second estimate recomputed once per window.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

use webglass_core::error::{Result, WebGlassError};

/// Decoded screenshot image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    image: Bytes,
}

impl Frame {
    pub fn new(image: impl Into<Bytes>) -> Self {
        Self { image: image.into() }
    }

    /// Decode the base64 `data` field of a screenshot message.
    pub fn from_base64(data: &str) -> Result<Self> {
        let raw = STANDARD
            .decode(data.trim())
            .map_err(|e| WebGlassError::Protocol(format!("screenshot data is not base64: {e}")))?;
        Ok(Self::new(raw))
    }

    pub fn image(&self) -> &Bytes {
        &self.image
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    DroppedDuplicate,
}

#[derive(Debug)]
pub struct FrameBuffer {
    latest: Option<Frame>,
    window: Duration,
    window_start: Instant,
    window_count: u64,
    fps: Option<u32>,
    rendered: u64,
    dropped: u64,
}

impl FrameBuffer {
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            latest: None,
            window,
            window_start: now,
            window_count: 0,
            fps: None,
            rendered: 0,
            dropped: 0,
        }
    }

    /// Accept or drop `frame`.
    pub fn accept(&mut self, frame: Frame, now: Instant) -> FrameOutcome {
        if self.latest.as_ref() == Some(&frame) {
            self.dropped += 1;
            return FrameOutcome::DroppedDuplicate;
        }
        self.latest = Some(frame);
        self.rendered += 1;
        self.window_count += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= self.window {
            let elapsed_ms = elapsed.as_millis().max(1) as u64;
            let fps = (self.window_count * 1000 + elapsed_ms / 2) / elapsed_ms;
            self.fps = Some(u32::try_from(fps).unwrap_or(u32::MAX));
            self.window_count = 0;
            self.window_start = now;
        }
        FrameOutcome::Rendered
    }

    /// Most recently rendered frame.
    pub fn latest(&self) -> Option<&Frame> {
        self.latest.as_ref()
    }

    /// Effective frame rate of the last completed window.
    pub fn fps(&self) -> Option<u32> {
        self.fps
    }

    pub fn rendered_count(&self) -> u64 {
        self.rendered
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }
}
