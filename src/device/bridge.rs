use async_trait::async_trait;

use crate::errors::BillDroidResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub serial: String,
    /// `device`, `unauthorized`, `offline`, ...
    pub state: String,
}

impl DeviceInfo {
    pub fn is_emulator(&self) -> bool {
        self.serial.contains("emulator")
    }

    pub fn is_ready(&self) -> bool {
        self.state == "device"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

/// Operations the navigation engine needs from the device.
///
/// Every method reports transport failures only (`DeviceUnreachable`); whether
/// a tap or swipe had the intended effect on the UI is never known here.
#[async_trait]
pub trait DeviceBridge: Send + Sync {
    async fn list_devices(&self) -> BillDroidResult<Vec<DeviceInfo>>;

    /// `true` once the device has finished booting and accepts shell commands.
    async fn is_boot_completed(&self) -> BillDroidResult<bool>;

    async fn is_screen_on(&self) -> BillDroidResult<bool>;

    /// Current screen-off timeout in milliseconds.
    async fn screen_off_timeout(&self) -> BillDroidResult<u64>;

    async fn set_screen_off_timeout(&self, millis: u64) -> BillDroidResult<()>;

    async fn wake_up(&self) -> BillDroidResult<()>;

    async fn close_app(&self, package: &str) -> BillDroidResult<()>;

    async fn start_app(&self, package: &str, activity: &str) -> BillDroidResult<()>;

    /// Package of the window holding input focus, if any.
    async fn foreground_package(&self) -> BillDroidResult<Option<String>>;

    async fn screen_size(&self) -> BillDroidResult<ScreenSize>;

    /// Serialized UI hierarchy. With `force_refresh == false` the bridge may
    /// return the last dump it produced, provided no input reached the device
    /// since.
    async fn dump_ui_tree(&self, force_refresh: bool) -> BillDroidResult<String>;

    async fn tap(&self, x: i32, y: i32) -> BillDroidResult<()>;

    async fn swipe(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> BillDroidResult<()>;

    async fn type_text(&self, text: &str) -> BillDroidResult<()>;
}

/// Picks the device to drive: the pinned serial if given, otherwise the first
/// ready physical device, otherwise the first ready emulator.
pub fn select_device<'a>(
    devices: &'a [DeviceInfo],
    pinned: Option<&str>,
) -> Option<&'a DeviceInfo> {
    let mut ready = devices.iter().filter(|d| d.is_ready());
    if let Some(serial) = pinned {
        return ready.find(|d| d.serial == serial);
    }
    let ready: Vec<&DeviceInfo> = ready.collect();
    ready
        .iter()
        .find(|d| !d.is_emulator())
        .or_else(|| ready.first())
        .copied()
}
