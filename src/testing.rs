// Scripted device bridge for unit tests.
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::device::bridge::{DeviceBridge, DeviceInfo, ScreenSize};
use crate::errors::{BillDroidError, BillDroidResult};
use crate::perception::coords::parse_bounds;
use crate::perception::types::Bounds;

pub const SCREEN: ScreenSize = ScreenSize {
    width: 1080,
    height: 2400,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    ListDevices,
    IsBootCompleted,
    IsScreenOn,
    GetScreenTimeout,
    SetScreenTimeout(u64),
    WakeUp,
    CloseApp(String),
    StartApp(String, String),
    ForegroundPackage,
    ScreenSize,
    /// Carries the `force_refresh` flag.
    Dump(bool),
    Tap(i32, i32),
    Swipe(i32, i32, i32, i32),
    TypeText(String),
}

/// One screen of a fake app and the inputs that move it to another screen.
pub struct FakeScreen {
    xml: String,
    on_tap: Vec<(Bounds, usize)>,
    on_swipe: Option<usize>,
    on_text: Option<usize>,
}

impl FakeScreen {
    pub fn new(xml: impl Into<String>) -> Self {
        Self {
            xml: xml.into(),
            on_tap: Vec::new(),
            on_swipe: None,
            on_text: None,
        }
    }

    /// A tap inside `bounds` (a `[x1,y1][x2,y2]` token) switches to screen `next`.
    pub fn on_tap(mut self, bounds: &str, next: usize) -> Self {
        let bounds = parse_bounds(bounds).expect("test bounds are well formed");
        self.on_tap.push((bounds, next));
        self
    }

    pub fn on_swipe(mut self, next: usize) -> Self {
        self.on_swipe = Some(next);
        self
    }

    pub fn on_text(mut self, next: usize) -> Self {
        self.on_text = Some(next);
        self
    }
}

enum Mode {
    /// Each dump pops the next entry; the last one repeats forever.
    Scripted(VecDeque<String>),
    Machine { screens: Vec<FakeScreen>, current: usize },
}

struct FakeState {
    mode: Mode,
    calls: Vec<BridgeCall>,
    screen_on: bool,
    fail_dumps: bool,
    devices: Vec<DeviceInfo>,
    /// Boot checks answered "not yet" before the device reports ready.
    boot_pending: u32,
    screen_timeout: u64,
    foreground: Option<String>,
    /// Whether a started app ever takes the foreground.
    app_starts: bool,
}

pub struct FakeBridge {
    state: Mutex<FakeState>,
}

impl FakeBridge {
    fn with_mode(mode: Mode) -> Self {
        Self {
            state: Mutex::new(FakeState {
                mode,
                calls: Vec::new(),
                screen_on: true,
                fail_dumps: false,
                devices: vec![DeviceInfo {
                    serial: "FAKE0001".into(),
                    state: "device".into(),
                }],
                boot_pending: 0,
                screen_timeout: 30_000,
                foreground: None,
                app_starts: true,
            }),
        }
    }

    pub fn scripted<I, S>(dumps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(Mode::Scripted(dumps.into_iter().map(Into::into).collect()))
    }

    pub fn machine(screens: Vec<FakeScreen>) -> Self {
        Self::with_mode(Mode::Machine {
            screens,
            current: 0,
        })
    }

    pub fn set_screen_on(&self, on: bool) {
        self.state.lock().unwrap().screen_on = on;
    }

    pub fn fail_dumps(&self) {
        self.state.lock().unwrap().fail_dumps = true;
    }

    pub fn set_devices(&self, devices: Vec<DeviceInfo>) {
        self.state.lock().unwrap().devices = devices;
    }

    pub fn set_boot_pending(&self, checks: u32) {
        self.state.lock().unwrap().boot_pending = checks;
    }

    pub fn set_app_starts(&self, starts: bool) {
        self.state.lock().unwrap().app_starts = starts;
    }

    pub fn screen_timeout(&self) -> u64 {
        self.state.lock().unwrap().screen_timeout
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&BridgeCall) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn current_screen(&self) -> Option<usize> {
        match &self.state.lock().unwrap().mode {
            Mode::Machine { current, .. } => Some(*current),
            Mode::Scripted(_) => None,
        }
    }

    fn record(&self, call: BridgeCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn transition(&self, pick: impl Fn(&FakeScreen) -> Option<usize>) {
        let mut state = self.state.lock().unwrap();
        if let Mode::Machine { screens, current } = &mut state.mode {
            if let Some(next) = screens.get(*current).and_then(|s| pick(s)) {
                *current = next;
            }
        }
    }
}

#[async_trait]
impl DeviceBridge for FakeBridge {
    async fn list_devices(&self) -> BillDroidResult<Vec<DeviceInfo>> {
        self.record(BridgeCall::ListDevices);
        Ok(self.state.lock().unwrap().devices.clone())
    }

    async fn is_boot_completed(&self) -> BillDroidResult<bool> {
        self.record(BridgeCall::IsBootCompleted);
        let mut state = self.state.lock().unwrap();
        if state.boot_pending > 0 {
            state.boot_pending -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    async fn is_screen_on(&self) -> BillDroidResult<bool> {
        self.record(BridgeCall::IsScreenOn);
        Ok(self.state.lock().unwrap().screen_on)
    }

    async fn screen_off_timeout(&self) -> BillDroidResult<u64> {
        self.record(BridgeCall::GetScreenTimeout);
        Ok(self.state.lock().unwrap().screen_timeout)
    }

    async fn set_screen_off_timeout(&self, millis: u64) -> BillDroidResult<()> {
        self.record(BridgeCall::SetScreenTimeout(millis));
        self.state.lock().unwrap().screen_timeout = millis;
        Ok(())
    }

    async fn wake_up(&self) -> BillDroidResult<()> {
        self.record(BridgeCall::WakeUp);
        self.state.lock().unwrap().screen_on = true;
        Ok(())
    }

    async fn close_app(&self, package: &str) -> BillDroidResult<()> {
        self.record(BridgeCall::CloseApp(package.into()));
        self.state.lock().unwrap().foreground = None;
        Ok(())
    }

    async fn start_app(&self, package: &str, activity: &str) -> BillDroidResult<()> {
        self.record(BridgeCall::StartApp(package.into(), activity.into()));
        let mut state = self.state.lock().unwrap();
        if state.app_starts {
            state.foreground = Some(package.to_string());
        }
        Ok(())
    }

    async fn foreground_package(&self) -> BillDroidResult<Option<String>> {
        self.record(BridgeCall::ForegroundPackage);
        Ok(self.state.lock().unwrap().foreground.clone())
    }

    async fn screen_size(&self) -> BillDroidResult<ScreenSize> {
        self.record(BridgeCall::ScreenSize);
        Ok(SCREEN)
    }

    async fn dump_ui_tree(&self, force_refresh: bool) -> BillDroidResult<String> {
        self.record(BridgeCall::Dump(force_refresh));
        let mut state = self.state.lock().unwrap();
        if state.fail_dumps {
            return Err(BillDroidError::DeviceUnreachable("device offline".into()));
        }
        let xml = match &mut state.mode {
            Mode::Scripted(queue) => {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            }
            Mode::Machine { screens, current } => screens.get(*current).map(|s| s.xml.clone()),
        };
        Ok(xml.unwrap_or_default())
    }

    async fn tap(&self, x: i32, y: i32) -> BillDroidResult<()> {
        self.record(BridgeCall::Tap(x, y));
        self.transition(|s| {
            s.on_tap
                .iter()
                .find(|(bounds, _)| bounds.contains(x, y))
                .map(|(_, next)| *next)
        });
        Ok(())
    }

    async fn swipe(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> BillDroidResult<()> {
        self.record(BridgeCall::Swipe(x1, y1, x2, y2));
        self.transition(|s| s.on_swipe);
        Ok(())
    }

    async fn type_text(&self, text: &str) -> BillDroidResult<()> {
        self.record(BridgeCall::TypeText(text.into()));
        self.transition(|s| s.on_text);
        Ok(())
    }
}
