// Touch and text input against the device.
use std::sync::Arc;

use crate::device::bridge::DeviceBridge;
use crate::device::session::SleepUnit;
use crate::errors::BillDroidResult;
use crate::perception::capture::ScreenCapture;

/// Fire-and-forget input primitives. Success means the bridge accepted the
/// command; confirming the effect on screen is the caller's job. Each action
/// drops the cached dump since the UI may have moved on.
pub struct InputActuator {
    bridge: Arc<dyn DeviceBridge>,
    capture: Arc<ScreenCapture>,
    sleep: SleepUnit,
}

impl InputActuator {
    pub fn new(bridge: Arc<dyn DeviceBridge>, capture: Arc<ScreenCapture>, sleep: SleepUnit) -> Self {
        Self {
            bridge,
            capture,
            sleep,
        }
    }

    /// Single tap, then `settle` sleep units for the UI to react.
    pub async fn tap(&self, x: i32, y: i32, settle: u32) -> BillDroidResult<()> {
        tracing::debug!(x, y, settle, "tap");
        let result = self.bridge.tap(x, y).await;
        self.capture.invalidate().await;
        result?;
        self.sleep.sleep(settle).await;
        Ok(())
    }

    pub async fn swipe(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> BillDroidResult<()> {
        tracing::debug!(x1, y1, x2, y2, "swipe");
        let result = self.bridge.swipe(x1, y1, x2, y2).await;
        self.capture.invalidate().await;
        result
    }

    /// Types into the focused field. `fast` sends the whole string in one
    /// bridge call; otherwise characters go one at a time, a sleep unit apart,
    /// for fields that drop input under bursts.
    pub async fn input_text(&self, text: &str, fast: bool) -> BillDroidResult<()> {
        tracing::debug!(chars = text.chars().count(), fast, "input text");
        let result = if fast {
            self.bridge.type_text(text).await
        } else {
            self.type_slowly(text).await
        };
        self.capture.invalidate().await;
        result
    }

    async fn type_slowly(&self, text: &str) -> BillDroidResult<()> {
        let mut buf = [0u8; 4];
        for c in text.chars() {
            self.bridge.type_text(c.encode_utf8(&mut buf)).await?;
            self.sleep.sleep(1).await;
        }
        Ok(())
    }
}
