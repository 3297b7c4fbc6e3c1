use std::time::Duration;

use crate::device::bridge::{DeviceBridge, ScreenSize};
use crate::errors::BillDroidResult;

/// Base sleep unit. Every delay in the engine is a multiple of it, so this is
/// the one knob for slow devices or slow bridge links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepUnit(Duration);

impl SleepUnit {
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    pub fn times(&self, units: u32) -> Duration {
        self.0 * units
    }

    pub async fn sleep(&self, units: u32) {
        let d = self.times(units);
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
    }
}

impl Default for SleepUnit {
    fn default() -> Self {
        Self::from_millis(100)
    }
}

/// One connected device. Screen dimensions are read once when the flow starts.
#[derive(Debug, Clone)]
pub struct DeviceSession {
    pub serial: String,
    pub screen: ScreenSize,
    pub sleep: SleepUnit,
}

impl DeviceSession {
    pub async fn open(
        bridge: &dyn DeviceBridge,
        serial: String,
        sleep: SleepUnit,
    ) -> BillDroidResult<Self> {
        let screen = bridge.screen_size().await?;
        tracing::info!(
            serial = %serial,
            width = screen.width,
            height = screen.height,
            sleep_ms = sleep.times(1).as_millis() as u64,
            "device session opened"
        );
        Ok(Self { serial, screen, sleep })
    }

    pub fn center(&self) -> (i32, i32) {
        (self.screen.width / 2, self.screen.height / 2)
    }
}
