pub mod adb;
pub mod bridge;
pub mod session;

pub use bridge::{DeviceBridge, DeviceInfo, ScreenSize};
pub use session::{DeviceSession, SleepUnit};
